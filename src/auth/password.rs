//! Password hashing using Argon2id.
//!
//! Passwords are stored as PHC strings produced by Argon2id (64 MB memory,
//! 3 iterations, 4 lanes, 32-byte output). Verification is constant-time and
//! answers `verify(raw, hash) -> bool`; the hash is never reversed.
//!
//! The [`PasswordHasher`] trait is the capability the auth flow depends on;
//! [`Argon2Hasher`] is the production implementation.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way adaptive hash capability.
///
/// Implementors must produce self-describing hashes (algorithm and
/// parameters embedded) so `verify` needs no external state.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a raw password for storage.
    fn hash(&self, raw: &str) -> Result<String, PasswordError>;

    /// Verifies a raw password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// malformed.
    fn verify(&self, raw: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id implementation of [`PasswordHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    fn argon2() -> Result<Argon2<'static>, PasswordError> {
        // m=64 MB, t=3, p=4: memory-hard enough to resist GPU cracking
        // while keeping login latency acceptable.
        let params = ParamsBuilder::new()
            .m_cost(65536)
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, raw: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = argon2::PasswordHasher::hash_password(&Self::argon2()?, raw.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify(&self, raw: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        // Parameters are embedded in the PHC string
        match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerifyError(format!(
                "Verification failed: {}",
                e
            ))),
        }
    }
}
