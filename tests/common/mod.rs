use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use cardledger::api::{self, AppState};
use cardledger::models::api_token::ApiToken;
use cardledger::models::debit_card::{CreateDebitCardData, DebitCard};
use cardledger::models::debit_card_transaction::{CreateTransactionData, DebitCardTransaction};
use cardledger::models::user::{CreateUserData, User};
use cardledger::services::currency::Currency;
use cardledger::services::{card_number, token};

/// A seeded user together with a live bearer token for it.
pub struct TestUser {
    pub user: User,
    pub token: String,
}

pub fn app(pool: PgPool) -> Router {
    api::router(AppState { pool })
}

pub async fn create_user(pool: &PgPool, name: &str) -> TestUser {
    let user = User::create(
        pool,
        CreateUserData {
            name: name.to_string(),
            email: format!("{name}@example.com"),
        },
    )
    .await
    .expect("failed to create user");

    let plaintext = token::generate().expect("failed to generate token");
    ApiToken::issue(pool, user.id, &plaintext)
        .await
        .expect("failed to issue token");

    TestUser {
        user,
        token: plaintext,
    }
}

pub async fn create_card(pool: &PgPool, user_id: Uuid) -> DebitCard {
    DebitCard::create(
        pool,
        CreateDebitCardData {
            user_id,
            card_type: "credit".to_string(),
            number: card_number::generate().expect("failed to generate card number"),
            expiration_date: card_number::expiration_date(),
        },
    )
    .await
    .expect("failed to create card")
}

pub async fn create_transaction(
    pool: &PgPool,
    debit_card_id: Uuid,
    amount: i64,
) -> DebitCardTransaction {
    DebitCardTransaction::create(
        pool,
        CreateTransactionData {
            debit_card_id,
            amount,
            currency_code: Currency::Eur,
        },
    )
    .await
    .expect("failed to create transaction")
}

/// Drives one request through the router and returns the status plus the
/// parsed JSON body (`Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
        None => builder.body(Body::empty()).expect("failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not valid JSON")
    };

    (status, json)
}
