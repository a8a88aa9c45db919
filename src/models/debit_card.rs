use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DebitCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_type: String,
    pub number: i64,
    pub expiration_date: DateTime<Utc>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDebitCardData {
    pub user_id: Uuid,
    pub card_type: String,
    pub number: i64,
    pub expiration_date: DateTime<Utc>,
}

/// Outcome of a guarded delete. `HasTransactions` means the card was left
/// untouched because dependent transactions exist.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    HasTransactions,
}

impl DebitCard {
    /// A card is active as long as it has never been disabled, or has been
    /// re-enabled since.
    pub fn is_active(&self) -> bool {
        self.disabled_at.is_none()
    }

    /// Creates a new debit card record
    pub async fn create(pool: &PgPool, data: CreateDebitCardData) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO debit_cards (user_id, card_type, number, expiration_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(&data.card_type)
        .bind(data.number)
        .bind(data.expiration_date)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a card by its internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM debit_cards WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Lists a user's cards in insertion order
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let cards = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM debit_cards
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Toggles the card's active state and returns the updated row.
    /// Re-disabling an already-inactive card keeps its original `disabled_at`.
    pub async fn set_active(
        pool: &PgPool,
        id: Uuid,
        is_active: bool,
    ) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            UPDATE debit_cards
            SET
                disabled_at = CASE WHEN $2 THEN NULL ELSE COALESCE(disabled_at, NOW()) END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Deletes a card unless it has dependent transactions. The dependency
    /// check and the delete run in one transaction with the card row locked,
    /// so a transaction inserted concurrently cannot slip between them.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<DeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            SELECT id FROM debit_cards WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (transaction_count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM debit_card_transactions WHERE debit_card_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if transaction_count > 0 {
            tx.rollback().await?;
            return Ok(DeleteOutcome::HasTransactions);
        }

        sqlx::query(
            r#"
            DELETE FROM debit_cards WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }
}
