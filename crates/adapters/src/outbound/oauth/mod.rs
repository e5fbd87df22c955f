//! Identity provider clients.
//!
//! Each provider turns an authorization payload into an
//! [`ExternalProfile`]. [`OAuthProviders`] routes requests to the
//! configured ones.

mod alipay;
mod miniprogram;
mod wechat;

use std::collections::HashMap;
use std::sync::Arc;

use application::dto::FederatedPayload;
use application::error::{ApplicationError, Result};
use application::ports::outbound::OAuthResolver;
use async_trait::async_trait;
use domain::auth::provider::FederatedProvider;
use domain::credential::ExternalProfile;
use domain::error::DomainError;

pub use alipay::{AlipayConfig, AlipayOAuth};
pub use miniprogram::{MiniProgramConfig, WeChatMiniProgram};
pub use wechat::{WeChatConfig, WeChatOAuth};

/// Failure talking to an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("{provider} returned {code}: {message}")]
    Provider {
        provider: FederatedProvider,
        code: String,
        message: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("cannot decrypt user data: {0}")]
    Decryption(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Client of one identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> FederatedProvider;

    async fn exchange(
        &self,
        payload: &FederatedPayload,
    ) -> std::result::Result<ExternalProfile, OAuthError>;
}

/// Configured identity providers.
#[derive(Default, Clone)]
pub struct OAuthProviders {
    providers: HashMap<FederatedProvider, Arc<dyn IdentityProvider>>,
}

impl OAuthProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `client`, replacing any client of the same provider.
    pub fn register(mut self, client: impl IdentityProvider + 'static) -> Self {
        self.providers.insert(client.provider(), Arc::new(client));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl OAuthResolver for OAuthProviders {
    fn supports(&self, provider: FederatedProvider) -> bool {
        self.providers.contains_key(&provider)
    }

    async fn resolve(
        &self,
        provider: FederatedProvider,
        payload: &FederatedPayload,
    ) -> Result<ExternalProfile> {
        let client = self.providers.get(&provider).ok_or_else(|| {
            DomainError::UnsupportedProvider(provider.tag().to_owned())
        })?;

        if payload.code.is_empty() {
            return Err(ApplicationError::resolution(
                "authorization code is required",
            ));
        }

        client.exchange(payload).await.map_err(|err| {
            tracing::warn!(%provider, error = %err, "identity provider exchange failed");
            ApplicationError::resolution(err)
        })
    }
}
