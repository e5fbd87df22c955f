//! Registration use case port.

use async_trait::async_trait;

use crate::dto::{AuthenticatedUser, RegisterRequestDto};
use crate::error::Result;

/// Inbound port for local account registration.
#[async_trait]
pub trait Register: Send + Sync {
    /// Create a local account and sign it in.
    async fn register(
        &self,
        request: RegisterRequestDto,
    ) -> Result<AuthenticatedUser>;
}
