//! User domain entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordHash;
use crate::credential::Credential;
use crate::error::{DomainError, Result};
use crate::identity::account::{Missing, UserBuilder};
use crate::identity::id::UserId;
use crate::identity::role::Role;

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Normal,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Self::Normal),
            other => Err(DomainError::validation(
                "status",
                format!("unknown status `{other}`"),
            )),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a registered user within the system domain.
///
/// `role` and `credential` are not optional: an account cannot exist without
/// both, see [`UserBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// `None` for accounts created through a federated provider.
    pub password: Option<PasswordHash>,
    pub gender: i32,
    pub location: String,
    pub avatar: String,
    pub mobile: Option<String>,
    pub idc: Option<String>,
    pub email: Option<String>,
    pub status: UserStatus,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    pub role: Role,
    pub credential: Credential,
}

impl User {
    /// Start building a [`User`].
    pub fn builder(id: UserId) -> UserBuilder<Missing, Missing> {
        UserBuilder::new(id)
    }

    /// Local login keys set on this account, in `mobile`, `idc`, `email`
    /// order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        [&self.mobile, &self.idc, &self.email]
            .into_iter()
            .filter_map(|value| value.as_deref())
    }

    /// Whether `identifier` equals one of the local login keys.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.identifiers().any(|key| key == identifier)
    }
}
