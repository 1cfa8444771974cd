//! Database records and store contracts.
//!
//! Each model module pairs a record struct with the store trait the auth
//! flow and handlers depend on, plus its PostgreSQL implementation:
//!
//! - `user`: user accounts ([`user::CredentialStore`])
//! - `refresh_token`: hashed refresh-token records ([`refresh_token::RefreshTokenStore`])
//! - `note`: per-owner notes ([`note::NoteStore`])
//!
//! The Postgres implementations live directly on `PgPool`, so production
//! code passes the pool where tests can pass an in-memory double.

pub mod note;
pub mod refresh_token;
pub mod user;
