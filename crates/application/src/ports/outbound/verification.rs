//! Registration verification port.

use async_trait::async_trait;
use domain::auth::registration::LocalIdentifier;

use crate::error::Result;

/// Port checking the verification code sent to a new identifier.
#[async_trait]
pub trait RegistrationVerifier: Send + Sync {
    /// `Ok(false)` rejects the registration.
    async fn verify(
        &self,
        identifier: &LocalIdentifier,
        code: &str,
        token: &str,
    ) -> Result<bool>;
}
