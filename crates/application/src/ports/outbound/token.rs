//! Interface for session token operations.

use domain::identity::id::UserId;

use crate::error::Result;

/// Claims contained in a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User id.
    pub id: String,
    /// Issuer.
    pub iss: String,
    /// Issued at (Unix timestamp).
    pub iat: u64,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
}

/// Port for token signing and verification.
pub trait TokenSigner: Send + Sync {
    /// Create a signed session token for `user_id`.
    fn sign(&self, user_id: &UserId, issued_at: u64) -> Result<String>;

    /// Decode and verify a token, returning its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}
