//! Identifier and password authentication.

use async_trait::async_trait;
use domain::auth::password::Password;
use domain::identity::user::User;

use super::Ports;
use super::orchestrator::AuthStrategy;
use crate::dto::AuthRequestDto;
use crate::error::{ApplicationError, Result};

/// Authenticates against the local identifier/password pair.
pub struct LocalPasswordStrategy {
    ports: Ports,
}

impl LocalPasswordStrategy {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl AuthStrategy for LocalPasswordStrategy {
    async fn resolve(&self, request: &AuthRequestDto) -> Result<User> {
        // Malformed input must look like any other failed login.
        let password = Password::new(request.password.as_str())
            .map_err(|_| ApplicationError::NotFound)?;
        if request.id.is_empty() {
            return Err(ApplicationError::NotFound);
        }

        self.ports
            .timeouts
            .persistence(self.ports.users.find_by_local_credentials(
                &request.id,
                &password,
                self.ports.password_hasher.as_ref(),
            ))
            .await?
            .ok_or(ApplicationError::NotFound)
    }
}
