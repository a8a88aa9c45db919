use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::{middleware::auth::AuthenticatedUser, AppState};
use crate::error::{AppError, Result, ValidationErrors};
use crate::models::debit_card::DebitCard;
use crate::models::debit_card_transaction::{CreateTransactionData, DebitCardTransaction};
use crate::services::{currency, currency::Currency, guard};

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub debit_card_id: Uuid,
    pub amount: i64,
    pub currency_code: String,
}

impl From<DebitCardTransaction> for TransactionResponse {
    fn from(transaction: DebitCardTransaction) -> Self {
        Self {
            id: transaction.id,
            debit_card_id: transaction.debit_card_id,
            amount: transaction.amount,
            currency_code: transaction.currency_code,
        }
    }
}

#[derive(Debug)]
struct ValidatedTransaction {
    debit_card_id: Uuid,
    amount: i64,
    currency_code: Currency,
}

fn validate_create(body: &Value) -> Result<ValidatedTransaction> {
    let mut errors = ValidationErrors::new();

    let debit_card_id = match body.get("debit_card_id") {
        None | Some(Value::Null) => {
            errors.add("debit_card_id", "The debit_card_id field is required.");
            None
        }
        Some(Value::String(value)) => match value.parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("debit_card_id", "The debit_card_id must be a valid identifier.");
                None
            }
        },
        Some(_) => {
            errors.add("debit_card_id", "The debit_card_id must be a valid identifier.");
            None
        }
    };

    let amount = match body.get("amount") {
        None | Some(Value::Null) => {
            errors.add("amount", "The amount field is required.");
            None
        }
        Some(value) => match value.as_i64() {
            Some(amount) if amount > 0 => Some(amount),
            _ => {
                errors.add("amount", "The amount must be a positive integer.");
                None
            }
        },
    };

    let currency_code = match body.get("currency_code") {
        None | Some(Value::Null) => {
            errors.add("currency_code", "The currency_code field is required.");
            None
        }
        Some(Value::String(value)) => match value.parse::<Currency>() {
            Ok(code) => Some(code),
            Err(_) => {
                errors.add(
                    "currency_code",
                    format!(
                        "The currency_code must be one of: {}.",
                        currency::supported_codes()
                    ),
                );
                None
            }
        },
        Some(_) => {
            errors.add(
                "currency_code",
                format!(
                    "The currency_code must be one of: {}.",
                    currency::supported_codes()
                ),
            );
            None
        }
    };

    match (debit_card_id, amount, currency_code) {
        (Some(debit_card_id), Some(amount), Some(currency_code)) if errors.is_empty() => {
            Ok(ValidatedTransaction {
                debit_card_id,
                amount,
                currency_code,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

/// Lists a card's transactions, oldest first. A card the caller does not
/// own denies with 403 whether or not it exists.
async fn list_transactions(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<TransactionResponse>>> {
    let card = DebitCard::find_by_id(&state.pool, card_id).await?;
    let card = guard::ensure_card_reference(user.user_id, card)?;

    let transactions = DebitCardTransaction::list_by_card(&state.pool, card.id).await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

async fn create_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    let validated = validate_create(&body)?;

    // Ownership is settled before anything is written; a denied request
    // leaves no row behind.
    let card = DebitCard::find_by_id(&state.pool, validated.debit_card_id).await?;
    let card = guard::ensure_card_reference(user.user_id, card)?;

    let transaction = DebitCardTransaction::create(
        &state.pool,
        CreateTransactionData {
            debit_card_id: card.id,
            amount: validated.amount,
            currency_code: validated.currency_code,
        },
    )
    .await?;

    tracing::info!(
        transaction_id = %transaction.id,
        card_id = %card.id,
        amount = transaction.amount,
        currency = %transaction.currency_code,
        "Debit card transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

async fn show_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<TransactionResponse>> {
    let transaction = DebitCardTransaction::find_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::NotFound("Debit card transaction"))?;

    let card = DebitCard::find_by_id(&state.pool, transaction.debit_card_id).await?;
    guard::ensure_card_reference(user.user_id, card)?;

    Ok(Json(transaction.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debit-card-transactions", post(create_transaction))
        .route("/debit-card-transactions/:card_id", get(list_transactions))
        .route("/debit-card-transaction/:id", get(show_transaction))
}
