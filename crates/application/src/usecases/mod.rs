//! Application services implementing business logic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApplicationError, Result};
use crate::ports::outbound::{
    Clock, CredentialStore, PasswordHasher, RegistrationVerifier, RoleRepository,
    SecureRandom, TelemetryPort, TokenSigner, UserRepository,
};

/// Random bytes behind generated user, credential and role ids. Hex-encoded,
/// they fill [`domain::identity::id::MAX_ID_LENGTH`].
pub const ID_BYTES: usize = 16;

pub mod federated;
pub mod local;
pub mod orchestrator;
pub mod role;

pub use federated::*;
pub use local::*;
pub use orchestrator::*;
pub use role::*;

/// Upper bounds on outbound calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub persistence: Duration,
    pub resolution: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            persistence: Duration::from_secs(5),
            resolution: Duration::from_secs(10),
        }
    }
}

impl Timeouts {
    /// Bound a storage call.
    pub async fn persistence<T>(
        &self,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.persistence, call)
            .await
            .map_err(|_| ApplicationError::persistence("storage call timed out"))?
    }

    /// Bound an identity provider or verification call.
    pub async fn resolution<T>(
        &self,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.resolution, call)
            .await
            .map_err(|_| {
                ApplicationError::resolution("identity provider timed out")
            })?
    }
}

/// Outbound ports shared by every use case.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub credentials: Arc<dyn CredentialStore>,
    pub roles: Arc<dyn RoleRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_signer: Arc<dyn TokenSigner>,
    pub verifier: Arc<dyn RegistrationVerifier>,
    pub random: Arc<dyn SecureRandom>,
    pub clock: Arc<dyn Clock>,
    pub telemetry: Arc<dyn TelemetryPort>,
    pub timeouts: Timeouts,
}

impl Ports {
    pub(crate) fn new_id(&self) -> Result<String> {
        self.random.random_hex(ID_BYTES)
    }
}
