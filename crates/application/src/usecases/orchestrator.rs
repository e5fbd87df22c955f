//! Entry point of every authentication and registration request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::auth::provider::{AuthProvider, FederatedProvider};
use domain::auth::registration::RegistrationForm;
use domain::error::DomainError;
use domain::identity::id::UserId;
use domain::identity::user::User;

use super::{FederatedStrategy, LocalPasswordStrategy, Ports, RoleProvisioner};
use crate::dto::{AuthRequestDto, AuthenticatedUser, RegisterRequestDto};
use crate::error::{ApplicationError, Result};
use crate::ports::inbound::{Authenticate, Register};
use crate::ports::outbound::OAuthResolver;

/// Turns an authentication request into a user.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn resolve(&self, request: &AuthRequestDto) -> Result<User>;
}

/// Dispatches requests to the strategy registered for their provider and
/// issues session tokens.
pub struct AuthOrchestrator {
    strategies: HashMap<AuthProvider, Arc<dyn AuthStrategy>>,
    provisioner: RoleProvisioner,
    ports: Ports,
}

/// Builder for [`AuthOrchestrator`].
pub struct AuthOrchestratorBuilder {
    strategies: HashMap<AuthProvider, Arc<dyn AuthStrategy>>,
    provisioner: RoleProvisioner,
    ports: Ports,
}

impl AuthOrchestrator {
    pub fn builder(ports: Ports) -> AuthOrchestratorBuilder {
        let provisioner = RoleProvisioner::new(
            Arc::clone(&ports.roles),
            Arc::clone(&ports.random),
            ports.timeouts,
        );

        AuthOrchestratorBuilder {
            strategies: HashMap::new(),
            provisioner,
            ports,
        }
    }

    /// Providers with a registered strategy.
    pub fn providers(&self) -> impl Iterator<Item = AuthProvider> + '_ {
        self.strategies.keys().copied()
    }

    pub fn provisioner(&self) -> &RoleProvisioner {
        &self.provisioner
    }

    fn issue(&self, user: User) -> Result<AuthenticatedUser> {
        let token = self.ports.token_signer.sign(&user.id, self.ports.clock.now())?;

        Ok(AuthenticatedUser {
            user: User {
                password: None,
                ..user
            },
            token,
        })
    }
}

impl AuthOrchestratorBuilder {
    /// Register identifier/password authentication.
    pub fn with_local(self) -> Self {
        let strategy = LocalPasswordStrategy::new(self.ports.clone());
        self.strategy(AuthProvider::Local, Arc::new(strategy))
    }

    /// Register one strategy per provider `resolver` supports.
    pub fn with_federated(mut self, resolver: Arc<dyn OAuthResolver>) -> Self {
        for provider in FederatedProvider::ALL {
            if !resolver.supports(provider) {
                tracing::debug!(%provider, "provider not configured, skipping");
                continue;
            }

            let strategy = FederatedStrategy::new(
                provider,
                Arc::clone(&resolver),
                self.provisioner.clone(),
                self.ports.clone(),
            );
            self = self.strategy(AuthProvider::Federated(provider), Arc::new(strategy));
        }
        self
    }

    /// Register `strategy` for `provider`, replacing any previous one.
    pub fn strategy(
        mut self,
        provider: AuthProvider,
        strategy: Arc<dyn AuthStrategy>,
    ) -> Self {
        self.strategies.insert(provider, strategy);
        self
    }

    pub fn build(self) -> AuthOrchestrator {
        AuthOrchestrator {
            strategies: self.strategies,
            provisioner: self.provisioner,
            ports: self.ports,
        }
    }
}

#[async_trait]
impl Authenticate for AuthOrchestrator {
    async fn authenticate(
        &self,
        request: AuthRequestDto,
    ) -> Result<AuthenticatedUser> {
        let provider: AuthProvider = request.provider.parse()?;
        let Some(strategy) = self.strategies.get(&provider) else {
            return Err(DomainError::UnsupportedProvider(request.provider).into());
        };

        let user = match strategy.resolve(&request).await {
            Ok(user) => user,
            Err(err) => {
                self.ports
                    .telemetry
                    .record_auth_failure(provider.tag(), err.kind().as_str());
                return Err(err);
            },
        };

        let authenticated = self.issue(user)?;
        self.ports
            .telemetry
            .record_auth_success(authenticated.user.id.as_str(), provider.tag());

        Ok(authenticated)
    }
}

#[async_trait]
impl Register for AuthOrchestrator {
    async fn register(
        &self,
        request: RegisterRequestDto,
    ) -> Result<AuthenticatedUser> {
        let registration = RegistrationForm {
            id: &request.id,
            kind: &request.kind,
            password: &request.password,
            code: &request.code,
            token: &request.token,
        }
        .validate()?;

        let verified = self
            .ports
            .timeouts
            .resolution(self.ports.verifier.verify(
                &registration.identifier,
                &registration.code,
                &registration.token,
            ))
            .await?;
        if !verified {
            return Err(DomainError::validation(
                "code",
                "verification code is invalid",
            )
            .into());
        }

        let taken = self
            .ports
            .timeouts
            .persistence(
                self.ports
                    .users
                    .find_by_local_identifier(registration.identifier.as_str()),
            )
            .await?;
        if taken.is_some() {
            return Err(ApplicationError::DuplicateUser);
        }

        let password = self.ports.password_hasher.hash(&registration.password)?;
        let role = self.provisioner.ensure_default_role().await?;
        let credential = self
            .ports
            .timeouts
            .persistence(self.ports.credentials.create_empty(self.ports.new_id()?))
            .await?;

        let user = User::builder(UserId::parse(self.ports.new_id()?)?)
            .identifier(&registration.identifier)
            .password(password)
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
            kind = registration.identifier.kind(),
            "account registered"
        );
        self.ports
            .telemetry
            .record_account_created(user.id.as_str(), AuthProvider::Local.tag());

        self.issue(user)
    }
}
