//! The register/login/refresh flow.
//!
//! Each call is stateless; there is no cross-call session. The service
//! orchestrates the password hasher, the token codec, the credential store
//! and the refresh-token store, and owns the single-use rotation rule:
//! every refresh deletes the presented token's stored digest before issuing
//! a replacement pair, so a refresh token can be exchanged at most once.
//!
//! The flow depends only on the [`PasswordHasher`], [`TokenCodec`] and
//! store traits, never on a concrete algorithm or database.

use std::sync::Arc;

use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::jwt::{JwtError, TokenCodec};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::models::refresh_token::RefreshTokenStore;
use crate::models::user::{CreateUser, CredentialStore, User};

/// Error type for the auth flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Registration with an email that already has an account.
    #[error("a user with that email already exists")]
    EmailTaken,

    /// Login failure. Unknown email and wrong password both land here so
    /// the error cannot be used to enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The presented refresh token failed signature, expiry or type
    /// validation, or its subject no longer exists.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The token is cryptographically valid but has no stored digest:
    /// already consumed by an earlier refresh, revoked, or never issued.
    #[error("refresh token not recognized")]
    RefreshTokenNotRecognized,

    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Failure while issuing new tokens (validation failures map to the
    /// variants above instead).
    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// An access/refresh token pair returned to the caller.
///
/// Transient by design: the pair is never persisted as a unit, and the
/// refresh token itself is persisted only as a digest.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Computes the storage digest of a raw token: SHA-256 over its UTF-8
/// bytes, standard base64-encoded. Used only as a lookup key.
pub fn hash_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// The auth flow orchestrator.
#[derive(Clone)]
pub struct AuthService {
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<dyn TokenCodec>,
    users: Arc<dyn CredentialStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl AuthService {
    pub fn new(
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<dyn TokenCodec>,
        users: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            hasher,
            codec,
            users,
            refresh_tokens,
        }
    }

    /// Registers a new account.
    ///
    /// The email is whitespace-trimmed before both the uniqueness check and
    /// the write. No tokens are issued on registration; the caller logs in
    /// separately.
    ///
    /// # Errors
    ///
    /// [`AuthError::EmailTaken`] when an account with that email exists.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "registered new user");
        Ok(user)
    }

    /// Authenticates by email and password and issues a token pair.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] whether the email is unknown or the
    /// password is wrong - the two cases are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id).await?;

        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new token pair, consuming it.
    ///
    /// Validation order matters: signature/expiry/type first (no store
    /// access for tokens that fail closed), then the subject must still
    /// exist, then the stored digest must be present. The digest record is
    /// deleted before the new pair is issued - rotation invalidates the
    /// presented token regardless of outcome.
    ///
    /// A token whose signature verifies but whose digest is absent is
    /// treated as already-rotated-away or forged, never re-accepted.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidRefreshToken`] on signature/expiry/type failure
    /// or a vanished subject; [`AuthError::RefreshTokenNotRecognized`] when
    /// no stored digest matches.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .validate_refresh_token(raw_refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let hashed = hash_token(raw_refresh_token);

        self.refresh_tokens
            .find_by_user_and_hash(user.id, &hashed)
            .await?
            .ok_or(AuthError::RefreshTokenNotRecognized)?;

        // Single-use enforcement: the presented token dies here.
        self.refresh_tokens
            .delete_by_user_and_hash(user.id, &hashed)
            .await?;

        let pair = self.issue_pair(user.id).await?;

        tracing::debug!(user_id = %user.id, "refresh token rotated");
        Ok(pair)
    }

    /// Issues a fresh pair and persists the new refresh token's digest.
    async fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self.codec.issue_access_token(user_id)?;
        let refresh_token = self.codec.issue_refresh_token(user_id)?;

        let expires_at = Utc::now() + self.codec.refresh_token_validity();
        self.refresh_tokens
            .save(user_id, &hash_token(&refresh_token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
