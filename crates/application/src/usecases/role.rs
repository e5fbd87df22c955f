//! Default role provisioning.

use std::sync::Arc;

use domain::identity::role::{DEFAULT_ROLE, Role};

use super::{ID_BYTES, Timeouts};
use crate::error::{ApplicationError, Result};
use crate::ports::outbound::{RoleRepository, SecureRandom};

/// Makes sure the role every new account receives exists.
#[derive(Clone)]
pub struct RoleProvisioner {
    roles: Arc<dyn RoleRepository>,
    random: Arc<dyn SecureRandom>,
    timeouts: Timeouts,
}

impl RoleProvisioner {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        random: Arc<dyn SecureRandom>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            roles,
            random,
            timeouts,
        }
    }

    /// Return the default role, creating it on first use.
    ///
    /// Concurrent callers all end up with the same stored role.
    pub async fn ensure_default_role(&self) -> Result<Role> {
        if let Some(role) = self
            .timeouts
            .persistence(self.roles.find_by_name(DEFAULT_ROLE))
            .await?
        {
            return Ok(role);
        }

        let candidate = Role::new(self.random.random_hex(ID_BYTES)?, DEFAULT_ROLE);
        let role = self
            .timeouts
            .persistence(self.roles.insert_if_absent(&candidate))
            .await?;

        if !role.is_default() {
            return Err(ApplicationError::persistence(format!(
                "role store returned `{}` for `{DEFAULT_ROLE}`",
                role.name
            )));
        }

        if role.id == candidate.id {
            tracing::info!(role_id = %role.id, "default role created");
        }

        Ok(role)
    }
}
