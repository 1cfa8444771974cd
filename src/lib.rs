//! # Inkpad
//!
//! A minimal note-taking backend with email/password authentication,
//! short-lived JWT access tokens and rotating single-use refresh tokens.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `auth`: Password hashing, token issuance/validation, the auth flow
//! - `config`: Environment-based configuration
//! - `db`: Connection pool and migration runner
//! - `error`: Error handling and HTTP response mapping
//! - `models`: Database records and store contracts
//! - `routes`: API route handlers

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

/// Current crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
