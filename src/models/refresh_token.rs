//! Hashed refresh-token records.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE refresh_tokens (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     token_hash TEXT NOT NULL,
//!     expires_at TIMESTAMPTZ NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (user_id, token_hash)
//! );
//! ```
//!
//! Only the base64-encoded SHA-256 digest of a refresh token is ever
//! persisted. A leaked table cannot be replayed: presenting a token still
//! requires a valid signature, and the digest cannot be reversed into one.
//! A record is written on every login/refresh and deleted exactly once when
//! a refresh call consumes it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A stored refresh-token digest with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Base64-encoded SHA-256 digest of the raw token
    pub token_hash: String,

    /// Mirrors the token's own expiry claim, allowing expired rows to be
    /// swept without parsing tokens
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

/// Persistence contract for refresh-token records.
///
/// All lookups are scoped by `(user_id, token_hash)`: a digest is only
/// meaningful for the user the token was issued to.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persists a digest with its expiry.
    async fn save(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, sqlx::Error>;

    /// Finds the record for a user's token digest, if it exists.
    async fn find_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error>;

    /// Deletes the record for a user's token digest.
    ///
    /// Returns whether a record was actually deleted, so a concurrent
    /// refresh that lost the race can be detected where the database
    /// provides atomic deletes.
    async fn delete_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl RefreshTokenStore for PgPool {
    async fn save(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, sqlx::Error> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self)
        .await
    }

    async fn find_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at
            FROM refresh_tokens
            WHERE user_id = $1 AND token_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(self)
        .await
    }

    async fn delete_by_user_and_hash(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE user_id = $1 AND token_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .execute(self)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
