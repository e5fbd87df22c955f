//! Interfaces for cryptographic operations.

use domain::auth::password::{Password, PasswordHash};

use crate::error::Result;

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password using a secure algorithm.
    fn hash(&self, password: &Password) -> Result<PasswordHash>;

    /// Verify a password against a stored hash.
    ///
    /// `Ok(false)` on mismatch, `Err` when the hash cannot be used.
    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool>;

    /// Spend the same work as [`PasswordHasher::verify`] without a stored
    /// hash, so unknown identifiers answer as slowly as wrong passwords.
    fn verify_dummy(&self, password: &Password);
}

/// Port for secure random generation.
pub trait SecureRandom: Send + Sync {
    /// Hex-encode `byte_length` random bytes.
    fn random_hex(&self, byte_length: usize) -> Result<String>;
}
