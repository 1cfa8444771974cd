//! Authentication primitives and the auth flow.
//!
//! - [`password`]: one-way adaptive password hashing (Argon2id behind the
//!   [`password::PasswordHasher`] capability)
//! - [`jwt`]: signed, expiring bearer tokens (HS256 behind the
//!   [`jwt::TokenCodec`] capability)
//! - [`service`]: the register/login/refresh orchestration with single-use
//!   refresh-token rotation
//! - [`middleware`]: the authenticated-caller context extracted from access
//!   tokens
//!
//! The core flow in [`service`] depends only on the capability traits, never
//! on a concrete algorithm.

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
