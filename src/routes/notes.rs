//! Note endpoints, scoped to the authenticated caller.
//!
//! - `POST /notes` - save a note (optionally replacing one the caller owns)
//! - `GET /notes` - list the caller's notes
//! - `DELETE /notes/{id}` - delete a note the caller owns
//!
//! The caller's identity arrives as an [`AuthContext`] extension placed by
//! the JWT middleware; every operation takes it as an explicit argument.

use crate::{
    app::AppState,
    auth::middleware::AuthContext,
    error::{ApiError, ApiResult},
    models::note::{Note, NoteStore, SaveNote},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Note request body.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    /// Optional id for save-or-replace semantics
    pub id: Option<Uuid>,

    pub title: String,

    pub content: String,

    pub color: i64,
}

/// Note response body. The owner id is implied by the caller and not echoed.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub color: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            color: note.color,
            created_at: note.created_at,
        }
    }
}

/// Saves a note owned by `caller`.
pub(crate) async fn save_note(
    store: &dyn NoteStore,
    caller: AuthContext,
    req: NoteRequest,
) -> Result<NoteResponse, ApiError> {
    let saved = store
        .save(SaveNote {
            id: req.id,
            title: req.title,
            content: req.content,
            color: req.color,
            owner_id: caller.user_id,
        })
        .await?
        .ok_or_else(|| ApiError::Forbidden("Not the owner of this note".to_string()))?;

    Ok(saved.into())
}

/// Deletes `id` on behalf of `caller`.
///
/// A missing note is an error; a note owned by someone else is skipped
/// without signaling, matching the delete contract.
pub(crate) async fn delete_note(
    store: &dyn NoteStore,
    caller: AuthContext,
    id: Uuid,
) -> Result<(), ApiError> {
    let note = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.owner_id != caller.user_id {
        tracing::warn!(
            note_id = %id,
            caller = %caller.user_id,
            owner = %note.owner_id,
            "delete skipped: caller does not own note"
        );
        return Ok(());
    }

    store.delete_by_id(id).await?;
    Ok(())
}

/// `POST /notes`
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(req): Json<NoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let response = save_note(state.notes.as_ref(), caller, req).await?;
    Ok(Json(response))
}

/// `GET /notes`
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let notes = state.notes.list_by_owner(caller.user_id).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// `DELETE /notes/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    delete_note(state.notes.as_ref(), caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
