use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::debit_card::DebitCard;

/// Ownership predicate: a card belongs to exactly one user, and a
/// transaction belongs to whoever owns its card.
pub fn owns_card(user_id: Uuid, card: &DebitCard) -> bool {
    card.user_id == user_id
}

/// Denies with 403 when the card exists but belongs to someone else.
pub fn ensure_card_owner(user_id: Uuid, card: &DebitCard) -> Result<()> {
    if owns_card(user_id, card) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Guard for card references on the transaction surface, where absence and
/// non-ownership are indistinguishable to the caller: both deny with 403.
pub fn ensure_card_reference(user_id: Uuid, card: Option<DebitCard>) -> Result<DebitCard> {
    match card {
        Some(card) if owns_card(user_id, &card) => Ok(card),
        _ => Err(AppError::Forbidden),
    }
}
