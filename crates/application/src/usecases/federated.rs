//! Federated authentication with just-in-time provisioning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::auth::provider::FederatedProvider;
use domain::credential::{Credential, ExternalProfile, FederatedIdentity, OAuthCredential};
use domain::identity::id::UserId;
use domain::identity::user::User;

use super::orchestrator::AuthStrategy;
use super::{Ports, RoleProvisioner};
use crate::dto::AuthRequestDto;
use crate::error::{ApplicationError, Result};
use crate::ports::outbound::OAuthResolver;

/// Lookups made after losing a provisioning race. The winner may still be
/// between its credential and user inserts.
const REMATCH_ATTEMPTS: u32 = 3;
const REMATCH_DELAY: Duration = Duration::from_millis(25);

/// Authenticates through one external identity provider.
///
/// Identities seen for the first time get an account of their own.
pub struct FederatedStrategy {
    provider: FederatedProvider,
    resolver: Arc<dyn OAuthResolver>,
    provisioner: RoleProvisioner,
    ports: Ports,
}

impl FederatedStrategy {
    pub fn new(
        provider: FederatedProvider,
        resolver: Arc<dyn OAuthResolver>,
        provisioner: RoleProvisioner,
        ports: Ports,
    ) -> Self {
        Self {
            provider,
            resolver,
            provisioner,
            ports,
        }
    }

    async fn find(&self, identity: &FederatedIdentity) -> Result<Option<User>> {
        self.ports
            .timeouts
            .persistence(self.ports.users.find_by_federated_identity(identity))
            .await
    }

    /// Find the account a concurrent request provisioned for `identity`.
    async fn rematch(&self, identity: &FederatedIdentity) -> Result<User> {
        for attempt in 1..=REMATCH_ATTEMPTS {
            if let Some(user) = self.find(identity).await? {
                return Ok(user);
            }
            if attempt < REMATCH_ATTEMPTS {
                tokio::time::sleep(REMATCH_DELAY * attempt).await;
            }
        }

        Err(ApplicationError::DuplicateUser)
    }

    /// Credential to attach to a new account: one left unclaimed by an
    /// earlier failed provisioning, or a fresh one.
    async fn credential(&self, profile: &ExternalProfile) -> Result<Credential> {
        let identity = profile.identity();
        let unclaimed = self
            .ports
            .timeouts
            .persistence(self.ports.credentials.find_unclaimed(&identity))
            .await?;

        if let Some(credential) = unclaimed {
            tracing::warn!(
                credential_id = %credential.id,
                provider = %self.provider,
                "resuming provisioning on unclaimed credential"
            );
            return Ok(credential);
        }

        self.ports
            .timeouts
            .persistence(self.ports.credentials.create_for_provider(
                self.ports.new_id()?,
                self.provider,
                OAuthCredential::from(profile),
            ))
            .await
    }

    async fn provision(&self, profile: &ExternalProfile) -> Result<User> {
        let role = self.provisioner.ensure_default_role().await?;
        let credential = self.credential(profile).await?;

        let user = User::builder(UserId::parse(self.ports.new_id()?)?)
            .profile(profile)
            .role(role)
            .credential(credential)
            .created_at(self.ports.clock.now())
            .build();

        self.ports
            .timeouts
            .persistence(self.ports.users.create(&user))
            .await?;

        tracing::info!(
            user_id = %user.id,
            provider = %self.provider,
            "account provisioned"
        );
        self.ports
            .telemetry
            .record_account_created(user.id.as_str(), self.provider.tag());

        Ok(user)
    }
}

#[async_trait]
impl AuthStrategy for FederatedStrategy {
    async fn resolve(&self, request: &AuthRequestDto) -> Result<User> {
        let profile = self
            .ports
            .timeouts
            .resolution(self.resolver.resolve(self.provider, &request.federated))
            .await?;

        if profile.open_id.is_empty() {
            return Err(ApplicationError::resolution(format!(
                "{} returned no open id",
                self.provider
            )));
        }

        let identity = profile.identity();
        if let Some(user) = self.find(&identity).await? {
            return Ok(user);
        }

        match self.provision(&profile).await {
            Ok(user) => Ok(user),
            // Lost a provisioning race: the winner's account is the one to
            // sign in.
            Err(ApplicationError::DuplicateUser) => self.rematch(&identity).await,
            Err(err) => Err(err),
        }
    }
}
