use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::{middleware::auth::AuthenticatedUser, AppState};
use crate::error::{AppError, Result, ValidationErrors};
use crate::models::debit_card::{CreateDebitCardData, DebitCard, DeleteOutcome};
use crate::services::{card_number, guard};

/// Wire representation of a card. `number` and `expiration_date` are
/// system-generated; `is_active` is derived from `disabled_at`.
#[derive(Debug, Serialize)]
pub struct DebitCardResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub card_type: String,
    pub number: i64,
    #[serde(with = "expiration_format")]
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<DebitCard> for DebitCardResponse {
    fn from(card: DebitCard) -> Self {
        Self {
            id: card.id,
            is_active: card.is_active(),
            card_type: card.card_type,
            number: card.number,
            expiration_date: card.expiration_date,
        }
    }
}

/// Expiration dates go out as `YYYY-MM-DD HH:MM:SS`.
mod expiration_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }
}

fn validate_create(body: &Value) -> Result<String> {
    let mut errors = ValidationErrors::new();

    let card_type = match body.get("type") {
        None | Some(Value::Null) => {
            errors.add("type", "The type field is required.");
            None
        }
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                errors.add("type", "The type field is required.");
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.add("type", "The type must be a string.");
            None
        }
    };

    match card_type {
        Some(card_type) if errors.is_empty() => Ok(card_type),
        _ => Err(AppError::Validation(errors)),
    }
}

fn validate_update(body: &Value) -> Result<bool> {
    let mut errors = ValidationErrors::new();

    let Some(object) = body.as_object() else {
        errors.add("is_active", "The is_active field is required.");
        return Err(AppError::Validation(errors));
    };

    for key in object.keys() {
        if key != "is_active" {
            errors.add(key, format!("The {key} field is not allowed."));
        }
    }

    let is_active = match object.get("is_active") {
        None | Some(Value::Null) => {
            errors.add("is_active", "The is_active field is required.");
            None
        }
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => {
            errors.add("is_active", "The is_active field must be true or false.");
            None
        }
    };

    match is_active {
        Some(is_active) if errors.is_empty() => Ok(is_active),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Lists the caller's cards, oldest first. Other owners' cards are never
/// visible here.
async fn list_debit_cards(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DebitCardResponse>>> {
    let cards = DebitCard::list_by_user(&state.pool, user.user_id).await?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

async fn create_debit_card(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<DebitCardResponse>)> {
    let card_type = validate_create(&body)?;

    let number = card_number::generate().map_err(anyhow::Error::from)?;
    let card = DebitCard::create(
        &state.pool,
        CreateDebitCardData {
            user_id: user.user_id,
            card_type,
            number,
            expiration_date: card_number::expiration_date(),
        },
    )
    .await?;

    tracing::info!(card_id = %card.id, user_id = %user.user_id, "Debit card created");

    Ok((StatusCode::CREATED, Json(card.into())))
}

async fn show_debit_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<DebitCardResponse>> {
    let card = DebitCard::find_by_id(&state.pool, card_id)
        .await?
        .ok_or(AppError::NotFound("Debit card"))?;

    guard::ensure_card_owner(user.user_id, &card)?;

    Ok(Json(card.into()))
}

async fn update_debit_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(body): Json<Value>,
) -> Result<Json<DebitCardResponse>> {
    let card = DebitCard::find_by_id(&state.pool, card_id)
        .await?
        .ok_or(AppError::NotFound("Debit card"))?;

    guard::ensure_card_owner(user.user_id, &card)?;

    let is_active = validate_update(&body)?;
    let updated = DebitCard::set_active(&state.pool, card.id, is_active).await?;

    tracing::info!(card_id = %updated.id, is_active, "Debit card updated");

    Ok(Json(updated.into()))
}

async fn delete_debit_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<StatusCode> {
    let card = DebitCard::find_by_id(&state.pool, card_id)
        .await?
        .ok_or(AppError::NotFound("Debit card"))?;

    guard::ensure_card_owner(user.user_id, &card)?;

    match DebitCard::delete(&state.pool, card.id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!(card_id = %card.id, "Debit card deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteOutcome::HasTransactions => Err(AppError::CardHasTransactions),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debit-cards", get(list_debit_cards).post(create_debit_card))
        .route(
            "/debit-cards/:id",
            get(show_debit_card)
                .put(update_debit_card)
                .patch(update_debit_card)
                .delete(delete_debit_card),
        )
}
