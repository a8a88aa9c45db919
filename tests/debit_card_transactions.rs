mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use cardledger::models::debit_card::DebitCard;
use cardledger::models::debit_card_transaction::DebitCardTransaction;

use common::{app, create_card, create_transaction, create_user, send};

#[sqlx::test]
async fn customer_can_see_a_list_of_debit_card_transactions(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;

    let mut transactions = Vec::new();
    for i in 1..=10 {
        transactions.push(create_transaction(&pool, card.id, i * 100).await);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", card.id),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().expect("expected an array");
    assert_eq!(listed.len(), 10);

    let first = &listed[0];
    assert_eq!(first["amount"].as_i64(), Some(transactions[0].amount));
    assert_eq!(first["currency_code"], transactions[0].currency_code);
}

#[sqlx::test]
async fn transactions_are_listed_in_insertion_order(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;

    for amount in [300, 100, 500, 200] {
        create_transaction(&pool, card.id, amount).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", card.id),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let amounts: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["amount"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![300, 100, 500, 200]);
}

#[sqlx::test]
async fn customer_cannot_see_transactions_of_another_customers_debit_card(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let another_customer = create_user(&pool, "bob").await;
    let card = create_card(&pool, another_customer.user.id).await;
    create_transaction(&pool, card.id, 1000).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", card.id),
        Some(&customer.token),
        None,
    )
    .await;

    // Denied outright, not an empty list
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.is_array());
}

#[sqlx::test]
async fn listing_transactions_for_a_missing_card_is_forbidden(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", Uuid::new_v4()),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn transactions_of_an_inactive_card_remain_visible(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;
    create_transaction(&pool, card.id, 1000).await;
    DebitCard::set_active(&pool, card.id, false).await.unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", card.id),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[sqlx::test]
async fn customer_can_create_a_debit_card_transaction(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/debit-card-transactions",
        Some(&customer.token),
        Some(json!({
            "debit_card_id": card.id,
            "amount": 1000,
            "currency_code": "EUR",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"].as_i64(), Some(1000));
    assert_eq!(body["currency_code"], "EUR");
    assert_eq!(body["debit_card_id"], json!(card.id));

    let transaction_id = body["id"].as_str().unwrap().parse().unwrap();
    let stored = DebitCardTransaction::find_by_id(&pool, transaction_id)
        .await
        .unwrap()
        .expect("transaction should be persisted");
    assert_eq!(stored.amount, 1000);
    assert_eq!(stored.currency_code, "EUR");
    assert_eq!(stored.debit_card_id, card.id);
}

#[sqlx::test]
async fn customer_cannot_create_a_transaction_on_another_customers_debit_card(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let another_customer = create_user(&pool, "bob").await;
    let card = create_card(&pool, another_customer.user.id).await;

    let (status, _) = send(
        &app,
        "POST",
        "/debit-card-transactions",
        Some(&customer.token),
        Some(json!({
            "debit_card_id": card.id,
            "amount": 1000,
            "currency_code": "EUR",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing was written
    let count = DebitCardTransaction::count_for_card(&pool, card.id)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn transaction_validation_rejects_bad_amounts_and_currencies(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;

    for (body, field) in [
        (
            json!({ "debit_card_id": card.id, "amount": 0, "currency_code": "EUR" }),
            "amount",
        ),
        (
            json!({ "debit_card_id": card.id, "amount": -100, "currency_code": "EUR" }),
            "amount",
        ),
        (
            json!({ "debit_card_id": card.id, "amount": "lots", "currency_code": "EUR" }),
            "amount",
        ),
        (
            json!({ "debit_card_id": card.id, "amount": 1000, "currency_code": "JPY" }),
            "currency_code",
        ),
        (
            json!({ "amount": 1000, "currency_code": "EUR" }),
            "debit_card_id",
        ),
    ] {
        let (status, response) = send(
            &app,
            "POST",
            "/debit-card-transactions",
            Some(&customer.token),
            Some(body.clone()),
        )
        .await;

        assert_eq!(
            status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "body {body} was not rejected"
        );
        assert!(
            response["errors"][field].is_array(),
            "expected an error on {field} for body {body}"
        );
    }

    let count = DebitCardTransaction::count_for_card(&pool, card.id)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn customer_can_see_a_debit_card_transaction(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;
    let transaction = create_transaction(&pool, card.id, 2500).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/debit-card-transaction/{}", transaction.id),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"].as_i64(), Some(2500));
    assert_eq!(body["currency_code"], transaction.currency_code);
}

#[sqlx::test]
async fn customer_cannot_see_a_transaction_attached_to_another_customers_debit_card(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let another_customer = create_user(&pool, "bob").await;
    let card = create_card(&pool, another_customer.user.id).await;
    let transaction = create_transaction(&pool, card.id, 1000).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/debit-card-transaction/{}", transaction.id),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn showing_a_missing_transaction_is_not_found(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/debit-card-transaction/{}", Uuid::new_v4()),
        Some(&customer.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn transaction_endpoints_require_authentication(pool: PgPool) {
    let app = app(pool.clone());
    let customer = create_user(&pool, "alice").await;
    let card = create_card(&pool, customer.user.id).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/debit-card-transactions/{}", card.id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/debit-card-transactions",
        None,
        Some(json!({
            "debit_card_id": card.id,
            "amount": 1000,
            "currency_code": "EUR",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
