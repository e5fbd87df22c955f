//! Identity provider port.

use async_trait::async_trait;
use domain::auth::provider::FederatedProvider;
use domain::credential::ExternalProfile;

use crate::dto::FederatedPayload;
use crate::error::Result;

/// Port exchanging an authorization payload for an external profile.
#[async_trait]
pub trait OAuthResolver: Send + Sync {
    /// Whether `provider` is configured.
    fn supports(&self, provider: FederatedProvider) -> bool;

    /// Exchange `payload` with `provider`.
    ///
    /// Every failure is a [`crate::error::ApplicationError::Resolution`].
    async fn resolve(
        &self,
        provider: FederatedProvider,
        payload: &FederatedPayload,
    ) -> Result<ExternalProfile>;
}
