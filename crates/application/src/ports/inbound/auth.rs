//! Authentication use case port.

use async_trait::async_trait;

use crate::dto::{AuthRequestDto, AuthenticatedUser};
use crate::error::Result;

/// Inbound port for user authentication.
#[async_trait]
pub trait Authenticate: Send + Sync {
    /// Authenticate a user with local or federated credentials.
    ///
    /// A federated identity seen for the first time is provisioned.
    async fn authenticate(
        &self,
        request: AuthRequestDto,
    ) -> Result<AuthenticatedUser>;
}
