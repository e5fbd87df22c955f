//! User repository port.

use async_trait::async_trait;
use domain::auth::password::Password;
use domain::credential::FederatedIdentity;
use domain::identity::user::User;

use super::PasswordHasher;
use crate::error::Result;

/// Port for user persistence operations.
///
/// Users are returned with their role and credential attached.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the user whose mobile, national id or email equals
    /// `identifier`.
    ///
    /// More than one match is a persistence error.
    async fn find_by_local_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>>;

    /// Find the user linked to a federated identity.
    ///
    /// The open id match wins over the union id match.
    async fn find_by_federated_identity(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<User>>;

    /// Persist a new user whose role and credential already exist.
    ///
    /// Fails with [`crate::error::ApplicationError::DuplicateUser`] when an
    /// identifier is taken.
    async fn create(&self, user: &User) -> Result<()>;

    /// Find the user matching `identifier` whose password verifies.
    ///
    /// Unknown identifier and wrong password both give `Ok(None)`.
    async fn find_by_local_credentials(
        &self,
        identifier: &str,
        password: &Password,
        hasher: &dyn PasswordHasher,
    ) -> Result<Option<User>> {
        let Some(user) = self.find_by_local_identifier(identifier).await? else {
            hasher.verify_dummy(password);
            return Ok(None);
        };

        match &user.password {
            Some(hash) if hasher.verify(password, hash)? => Ok(Some(user)),
            Some(_) => Ok(None),
            None => {
                hasher.verify_dummy(password);
                Ok(None)
            },
        }
    }
}
