//! API route handlers.
//!
//! - `health`: liveness and database connectivity
//! - `auth`: register, login, refresh-token
//! - `notes`: note CRUD, scoped to the authenticated caller

pub mod auth;
pub mod health;
pub mod notes;
