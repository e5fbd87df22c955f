//! Role attached to every account.

use serde::{Deserialize, Serialize};

/// Name of the role every account receives.
pub const DEFAULT_ROLE: &str = "User";

/// A named role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

impl Role {
    /// Create a [`Role`].
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether this is the provisioning default.
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_ROLE
    }
}
