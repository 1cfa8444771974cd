//! Authenticated-caller context.
//!
//! The JWT middleware layer in `app` validates the bearer access token and
//! inserts an [`AuthContext`] into the request's extensions. Handlers take
//! the caller's identity from that explicit argument; there is no ambient
//! "current user" lookup anywhere else.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the authenticated caller, extracted from a validated access
/// token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id (the token's subject claim)
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates a context from a validated token's subject.
    pub fn from_subject(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
