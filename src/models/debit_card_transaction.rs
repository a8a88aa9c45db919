use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::services::currency::Currency;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DebitCardTransaction {
    pub id: Uuid,
    pub debit_card_id: Uuid,
    pub amount: i64,
    pub currency_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTransactionData {
    pub debit_card_id: Uuid,
    pub amount: i64,
    pub currency_code: Currency,
}

impl DebitCardTransaction {
    /// Records a transaction against a card. Ownership of the card must be
    /// established by the caller before anything is written.
    pub async fn create(pool: &PgPool, data: CreateTransactionData) -> Result<Self, sqlx::Error> {
        let transaction = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO debit_card_transactions (debit_card_id, amount, currency_code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.debit_card_id)
        .bind(data.amount)
        .bind(data.currency_code.as_str())
        .fetch_one(pool)
        .await?;

        Ok(transaction)
    }

    /// Finds a transaction by its internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let transaction = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM debit_card_transactions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(transaction)
    }

    /// Lists a card's transactions in insertion order
    pub async fn list_by_card(
        pool: &PgPool,
        debit_card_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let transactions = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM debit_card_transactions
            WHERE debit_card_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(debit_card_id)
        .fetch_all(pool)
        .await?;

        Ok(transactions)
    }

    /// Counts transactions attached to a card
    pub async fn count_for_card(pool: &PgPool, debit_card_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM debit_card_transactions WHERE debit_card_id = $1
            "#,
        )
        .bind(debit_card_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
