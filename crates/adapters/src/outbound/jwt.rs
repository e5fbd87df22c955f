//! JWT signing and verification.
//!
//! ES256 (ECDSA P-256) with a PEM key pair, or HS256 with a shared secret.

use application::error::{ApplicationError, Result, ResultExt};
use application::ports::outbound::{TokenClaims, TokenSigner};
use domain::identity::id::UserId;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

/// Default token lifetime: 7 days.
pub const DEFAULT_EXPIRATION: u64 = 7 * 24 * 60 * 60;

/// JWT signer.
pub struct JwtTokenSigner {
    algorithm: Algorithm,
    issuer: String,
    expires_in: u64,
    encoding_key: EncodingKey,
    decoding_key: Option<DecodingKey>,
}

impl JwtTokenSigner {
    /// ES256 signer. Without a public key, tokens can be issued but not
    /// verified.
    pub fn es256(
        issuer: impl Into<String>,
        private_key_pem: &str,
        public_key_pem: &str,
    ) -> Result<Self> {
        let encoding_key =
            EncodingKey::from_ec_pem(private_key_pem.as_bytes()).signing()?;

        let decoding_key = if !public_key_pem.is_empty() {
            Some(DecodingKey::from_ec_pem(public_key_pem.as_bytes()).signing()?)
        } else {
            None
        };

        Ok(Self {
            algorithm: Algorithm::ES256,
            issuer: issuer.into(),
            expires_in: DEFAULT_EXPIRATION,
            encoding_key,
            decoding_key,
        })
    }

    /// HS256 signer.
    pub fn hs256(issuer: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            expires_in: DEFAULT_EXPIRATION,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: Some(DecodingKey::from_secret(secret)),
        }
    }

    /// Set token lifetime, in seconds.
    pub fn with_expiration(mut self, expires_in: u64) -> Self {
        self.expires_in = expires_in;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    id: String,
    iss: String,
    iat: u64,
    exp: u64,
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, user_id: &UserId, issued_at: u64) -> Result<String> {
        let claims = JwtClaims {
            id: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at + self.expires_in,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .signing()
    }

    fn verify(&self, token: &str) -> Result<TokenClaims> {
        let decoding_key = self.decoding_key.as_ref().ok_or_else(|| {
            ApplicationError::signing("no public key configured")
        })?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data =
            decode::<JwtClaims>(token, decoding_key, &validation).signing()?;

        Ok(TokenClaims {
            id: token_data.claims.id,
            iss: token_data.claims.iss,
            iat: token_data.claims.iat,
            exp: token_data.claims.exp,
        })
    }
}
