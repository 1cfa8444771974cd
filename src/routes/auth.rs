//! Authentication endpoints.
//!
//! - `POST /auth/register` - create an account (no tokens issued)
//! - `POST /auth/login` - exchange credentials for a token pair
//! - `POST /auth/refresh-token` - rotate a refresh token into a new pair

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register / login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Refresh request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair response body.
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Registers a new account.
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: malformed email or empty password
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> ApiResult<StatusCode> {
    req.validate().map_err(validation_errors)?;

    state.auth.register(&req.email, &req.password).await?;

    Ok(StatusCode::OK)
}

/// Logs in and returns an access/refresh token pair.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate().map_err(validation_errors)?;

    let pair = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Exchanges a refresh token for a new pair, consuming the old one.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid, expired, wrong-type or already-consumed
///   refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = state.auth.refresh(&req.refresh_token).await?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}
