use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::services::token;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Registers a bearer token for a user. Only the digest is persisted;
    /// the plaintext is never recoverable from the store.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        plaintext: &str,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO api_tokens (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(token::digest(plaintext))
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Resolves a presented bearer token to its record, if any
    pub async fn find_by_token(
        pool: &PgPool,
        presented: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM api_tokens WHERE token_hash = $1
            "#,
        )
        .bind(token::digest(presented))
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Stamps the token as used now
    pub async fn touch(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE api_tokens SET last_used_at = NOW() WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Revokes a token
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM api_tokens WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
