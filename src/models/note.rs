//! Per-owner note records.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE notes (
//!     id UUID PRIMARY KEY,
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     title TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     color BIGINT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Notes are created, listed and deleted by their owning user only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A note.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,

    pub title: String,

    pub content: String,

    /// Numeric color tag chosen by the client
    pub color: i64,

    pub created_at: DateTime<Utc>,

    /// Owning user
    pub owner_id: Uuid,
}

/// Input for saving a note.
#[derive(Debug, Clone)]
pub struct SaveNote {
    /// Client-supplied id; when present, an existing note with this id is
    /// replaced (save-or-replace semantics)
    pub id: Option<Uuid>,

    pub title: String,

    pub content: String,

    pub color: i64,

    pub owner_id: Uuid,
}

/// Persistence contract for note records.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Saves a note.
    ///
    /// When `data.id` names an existing note, its title, content and color
    /// are replaced - but only if `data.owner_id` owns it. Returns `None`
    /// when the id exists under a different owner.
    async fn save(&self, data: SaveNote) -> Result<Option<Note>, sqlx::Error>;

    /// Lists all notes owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, sqlx::Error>;

    /// Looks up a note by id, regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, sqlx::Error>;

    /// Deletes a note by id. Returns whether a row was deleted.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl NoteStore for PgPool {
    async fn save(&self, data: SaveNote) -> Result<Option<Note>, sqlx::Error> {
        let id = data.id.unwrap_or_else(Uuid::new_v4);

        // The WHERE clause on the conflict arm makes replacing someone
        // else's note a no-row result instead of an overwrite.
        sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (id, owner_id, title, content, color)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                content = EXCLUDED.content,
                color = EXCLUDED.color
            WHERE notes.owner_id = EXCLUDED.owner_id
            RETURNING id, title, content, color, created_at, owner_id
            "#,
        )
        .bind(id)
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.color)
        .fetch_optional(self)
        .await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, color, created_at, owner_id
            FROM notes
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self)
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, color, created_at, owner_id
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(self)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
