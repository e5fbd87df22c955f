//! Argon2id password hasher implementation.

use application::error::{ApplicationError, Result};
use application::ports::outbound::PasswordHasher;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use domain::auth::password::{Password, PasswordHash as DomainPasswordHash};
use rand::rngs::OsRng;

const OUTPUT_LENGTH: usize = 32;

/// Argon2id password hasher adapter.
pub struct Argon2PasswordHasher {
    params: Params,
    /// Hash of a throwaway password, verified against when there is nothing
    /// else to verify.
    dummy: DomainPasswordHash,
}

impl Argon2PasswordHasher {
    /// Create a new Argon2 hasher with custom parameters.
    pub fn new(
        memory_cost: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self> {
        let params = Params::new(
            memory_cost,
            iterations,
            parallelism,
            Some(OUTPUT_LENGTH),
        )
        .map_err(|err| ApplicationError::persistence(err.to_string()))?;

        let dummy = hash_with(&params, &Password::new("popy")?)?;

        Ok(Self { params, dummy })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

fn hash_with(params: &Params, password: &Password) -> Result<DomainPasswordHash> {
    let argon2 =
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params.clone());
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| ApplicationError::persistence(err.to_string()))?;

    Ok(DomainPasswordHash::parse(hash.to_string())?)
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<DomainPasswordHash> {
        hash_with(&self.params, password)
    }

    fn verify(
        &self,
        password: &Password,
        hash: &DomainPasswordHash,
    ) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash.as_str())
            .map_err(|err| ApplicationError::persistence(err.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(ApplicationError::persistence(err.to_string())),
        }
    }

    fn verify_dummy(&self, password: &Password) {
        let _ = self.verify(password, &self.dummy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = Password::new("secret").unwrap();
        let hash = hasher.hash(&password).unwrap();

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password, &hash).unwrap());
        assert!(
            !hasher
                .verify(&Password::new("Secret").unwrap(), &hash)
                .unwrap()
        );
    }

    #[test]
    fn test_salt_is_random() {
        let hasher = hasher();
        let password = Password::new("secret").unwrap();
        assert_ne!(hasher.hash(&password).unwrap(), hasher.hash(&password).unwrap());
    }

    #[test]
    fn test_invalid_params() {
        assert!(Argon2PasswordHasher::new(0, 0, 0).is_err());
    }
}
