//! HTTP API.
pub mod auth;
pub mod model;
pub mod register;
pub mod status;
pub mod users;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use adapters::outbound::clock::SystemClock;
    use adapters::outbound::crypto::{Argon2PasswordHasher, OsRngRandom};
    use adapters::outbound::jwt::JwtTokenSigner;
    use adapters::outbound::oauth::{IdentityProvider, OAuthError, OAuthProviders};
    use adapters::outbound::persistence::memory::MemoryStore;
    use adapters::outbound::telemetry::TracingTelemetry;
    use adapters::outbound::verification::PresenceVerifier;
    use application::dto::FederatedPayload;
    use application::usecases::{Ports, Timeouts};
    use async_trait::async_trait;
    use domain::auth::provider::FederatedProvider;
    use domain::credential::ExternalProfile;
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;

    use crate::AppState;
    use crate::config::Configuration;

    pub const ISSUER: &str = "https://accounts.example.com/";
    pub const SECRET: &[u8] = b"router-secret";

    /// WeChat stand-in: the code is the open id, `expired` is refused.
    pub struct FakeWeChat;

    #[async_trait]
    impl IdentityProvider for FakeWeChat {
        fn provider(&self) -> FederatedProvider {
            FederatedProvider::WeChat
        }

        async fn exchange(
            &self,
            payload: &FederatedPayload,
        ) -> Result<ExternalProfile, OAuthError> {
            if payload.code == "expired" {
                return Err(OAuthError::Provider {
                    provider: FederatedProvider::WeChat,
                    code: "40029".into(),
                    message: "invalid code".into(),
                });
            }

            Ok(ExternalProfile {
                provider: FederatedProvider::WeChat,
                open_id: payload.code.clone(),
                union_id: None,
                name: "Lin".into(),
                gender: 2,
            })
        }
    }

    /// In-memory state with WeChat as the only provider.
    pub fn state() -> (MemoryStore, AppState) {
        let store = MemoryStore::new();
        let ports = Ports {
            users: Arc::new(store.clone()),
            credentials: Arc::new(store.clone()),
            roles: Arc::new(store.clone()),
            password_hasher: Arc::new(Argon2PasswordHasher::new(1024, 1, 1).unwrap()),
            token_signer: Arc::new(JwtTokenSigner::hs256(ISSUER, SECRET)),
            verifier: Arc::new(PresenceVerifier::new()),
            random: Arc::new(OsRngRandom::new()),
            clock: Arc::new(SystemClock::new()),
            telemetry: Arc::new(TracingTelemetry::new()),
            timeouts: Timeouts::default(),
        };
        let providers = OAuthProviders::new().register(FakeWeChat);

        let mut config = Configuration::default();
        config.name = "popy".into();
        config.url = ISSUER.into();

        let state = AppState {
            config: Arc::new(config),
            orchestrator: Arc::new(crate::orchestrator(ports, providers)),
            warnings: Arc::new(vec!["default role not provisioned: test".into()]),
            metrics: None,
        };

        (store, state)
    }

    pub async fn json<T: DeserializeOwned>(
        response: axum::http::Response<axum::body::Body>,
    ) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }
}
