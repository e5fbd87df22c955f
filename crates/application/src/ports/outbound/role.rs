//! Role repository port.

use async_trait::async_trait;
use domain::identity::role::Role;

use crate::error::Result;

/// Port for role persistence.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Insert `role` unless one with the same name exists, then return the
    /// stored role.
    async fn insert_if_absent(&self, role: &Role) -> Result<Role>;
}
