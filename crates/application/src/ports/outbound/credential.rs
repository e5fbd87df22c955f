//! Credential store port.

use async_trait::async_trait;
use domain::auth::provider::FederatedProvider;
use domain::credential::{Credential, FederatedIdentity, OAuthCredential};

use crate::error::Result;

/// Port for credential persistence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist `credential` and index its identity keys.
    ///
    /// Fails with [`crate::error::ApplicationError::DuplicateUser`] when a
    /// key is already linked to another credential.
    async fn create(&self, credential: &Credential) -> Result<()>;

    /// Find a credential linked to `identity` that no user owns yet.
    ///
    /// Left behind when the user insert of a provisioning fails after the
    /// credential was stored.
    async fn find_unclaimed(
        &self,
        identity: &FederatedIdentity,
    ) -> Result<Option<Credential>>;

    /// Persist a credential without provider blobs.
    async fn create_empty(&self, id: String) -> Result<Credential> {
        let credential = Credential::empty(id);
        self.create(&credential).await?;
        Ok(credential)
    }

    /// Persist a credential holding one provider blob.
    async fn create_for_provider(
        &self,
        id: String,
        provider: FederatedProvider,
        blob: OAuthCredential,
    ) -> Result<Credential> {
        let credential = Credential::for_provider(id, provider, blob);
        self.create(&credential).await?;
        Ok(credential)
    }
}
