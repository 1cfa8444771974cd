//! Signed bearer token issuance and validation.
//!
//! Access and refresh tokens are structurally identical JWTs signed with
//! HS256: both carry the subject user id, issuer, issued-at/not-before and
//! expiry claims. They differ only in validity window (minutes-scale vs
//! days-scale) and a `token_type` discriminator, which prevents an access
//! token from being replayed as a refresh token and vice versa.
//!
//! Validation fails closed: expired, malformed, wrong-type and bad-signature
//! tokens all come back as errors, never as claims.
//!
//! The [`TokenCodec`] trait is the capability the auth flow and middleware
//! depend on; [`JwtCodec`] is the production implementation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token.
const ISSUER: &str = "inkpad";

/// Error type for token operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Expected a {expected} token")]
    WrongTokenType { expected: &'static str },
}

/// Token type discriminator carried as a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived, authorizes API calls.
    Access,

    /// Long-lived, single-use, exchanged for a new token pair.
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims.
///
/// `sub` is the subject user id; `token_type` distinguishes access from
/// refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Unique token id. Makes every issued token distinct even for the
    /// same subject in the same second, so rotation always produces a new
    /// token (and a new stored digest).
    pub jti: Uuid,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims for `user_id` expiring `validity` from now.
    pub fn new(user_id: Uuid, token_type: TokenType, validity: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + validity;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    /// Whether the expiry claim is in the past.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signed-token capability used by the auth flow and middleware.
pub trait TokenCodec: Send + Sync {
    /// Issues a short-lived access token for `user_id`.
    fn issue_access_token(&self, user_id: Uuid) -> Result<String, JwtError>;

    /// Issues a long-lived refresh token for `user_id`.
    fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, JwtError>;

    /// Validates signature, expiry and type of an access token.
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;

    /// Validates signature, expiry and type of a refresh token.
    ///
    /// The subject id is read from the returned claims; there is no separate
    /// extraction step that could be reached without validation.
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;

    /// Refresh token validity window, used to compute persisted expiries.
    fn refresh_token_validity(&self) -> Duration;
}

/// HS256 JWT implementation of [`TokenCodec`].
#[derive(Clone)]
pub struct JwtCodec {
    secret: String,
    access_validity: Duration,
    refresh_validity: Duration,
}

impl JwtCodec {
    /// Creates a codec with explicit validity windows.
    pub fn new(secret: impl Into<String>, access_validity: Duration, refresh_validity: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_validity,
            refresh_validity,
        }
    }

    /// Creates a codec from the application's token configuration.
    pub fn from_config(config: &crate::config::JwtConfig) -> Self {
        Self::new(
            config.secret.clone(),
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, claims, &key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        })?;

        Ok(token_data.claims)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected: expected.as_str(),
            });
        }

        Ok(claims)
    }
}

impl TokenCodec for JwtCodec {
    fn issue_access_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, TokenType::Access, self.access_validity))
    }

    fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, TokenType::Refresh, self.refresh_validity))
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_typed(token, TokenType::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    fn refresh_token_validity(&self) -> Duration {
        self.refresh_validity
    }
}
