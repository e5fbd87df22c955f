//! popy registers accounts and logs them in, locally or through an identity
//! provider.

#![forbid(unsafe_code)]
mod database;
pub mod error;
mod router;
pub mod telemetry;

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adapters::outbound::clock::SystemClock;
use adapters::outbound::crypto::{Argon2PasswordHasher, OsRngRandom};
use adapters::outbound::jwt::JwtTokenSigner;
use adapters::outbound::oauth::{
    AlipayOAuth, OAuthProviders, WeChatMiniProgram, WeChatOAuth,
};
use adapters::outbound::persistence::memory::MemoryStore;
use adapters::outbound::persistence::postgres::{
    PgCredentialStore, PgRoleRepository, PgUserRepository,
};
use adapters::outbound::telemetry::TracingTelemetry;
use adapters::outbound::verification::PresenceVerifier;
use application::ports::outbound::{CredentialStore, RoleRepository, UserRepository};
use application::usecases::{AuthOrchestrator, Ports, Timeouts};
use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub orchestrator: Arc<AuthOrchestrator>,
    /// Non-fatal bootstrap failures, shown on `/status.json`.
    pub warnings: Arc<Vec<String>>,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .route("/metrics", get(router::status::metrics))
        // `POST /auth` goes to `auth`.
        .route("/auth", post(router::auth::handler))
        .nest("/users", router::users::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Local login plus one strategy per configured provider.
pub fn orchestrator(ports: Ports, providers: OAuthProviders) -> AuthOrchestrator {
    AuthOrchestrator::builder(ports)
        .with_local()
        .with_federated(Arc::new(providers))
        .build()
}

fn token_signer(
    config: &config::Configuration,
) -> Result<JwtTokenSigner, Box<dyn std::error::Error>> {
    let Some(token) = &config.token else {
        return Err("missing `token` entry on `config.yaml` file".into());
    };

    let signer = match (&token.private_key_pem, &token.secret) {
        (Some(private_key), _) => JwtTokenSigner::es256(
            &config.url,
            private_key,
            token.public_key_pem.as_deref().unwrap_or_default(),
        )?,
        (None, Some(secret)) => JwtTokenSigner::hs256(&config.url, secret.as_bytes()),
        (None, None) => {
            return Err("`token` needs `private_key_pem` or `secret`".into());
        },
    };

    Ok(match token.expires_in {
        Some(expires_in) => signer.with_expiration(expires_in),
        None => signer,
    })
}

fn oauth_providers(
    config: &config::OAuth,
    timeouts: Timeouts,
) -> Result<OAuthProviders, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(timeouts.resolution)
        .build()?;

    let mut providers = OAuthProviders::new();
    if let Some(wechat) = &config.wechat {
        providers = providers.register(WeChatOAuth::new(wechat.clone(), client.clone()));
    }
    if let Some(miniprogram) = &config.wechat_miniprogram {
        providers = providers
            .register(WeChatMiniProgram::new(miniprogram.clone(), client.clone()));
    }
    if let Some(alipay) = &config.alipay {
        providers = providers.register(AlipayOAuth::new(alipay.clone(), client)?);
    }

    if providers.is_empty() {
        tracing::info!("no `oauth` provider configured, federated login disabled");
    }

    Ok(providers)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file.  let it in memory.
    let path = std::env::var(config::CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_default();
    let config = config::Configuration::default().path(path).read()?;
    let timeouts: Timeouts = config.timeouts.into();

    let (users, credentials, roles): (
        Arc<dyn UserRepository>,
        Arc<dyn CredentialStore>,
        Arc<dyn RoleRepository>,
    ) = match &config.postgres {
        Some(postgres) => {
            let pool = database::connect(postgres).await?;
            (
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgCredentialStore::new(pool.clone())),
                Arc::new(PgRoleRepository::new(pool)),
            )
        },
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, accounts are kept in memory"
            );
            let store = MemoryStore::new();
            (Arc::new(store.clone()), Arc::new(store.clone()), Arc::new(store))
        },
    };

    let argon2 = config.argon2.clone().unwrap_or_default();
    let password_hasher = Argon2PasswordHasher::new(
        argon2.memory_cost,
        argon2.iterations,
        argon2.parallelism,
    )?;

    let ports = Ports {
        users,
        credentials,
        roles,
        password_hasher: Arc::new(password_hasher),
        token_signer: Arc::new(token_signer(&config)?),
        verifier: Arc::new(PresenceVerifier::new()),
        random: Arc::new(OsRngRandom::new()),
        clock: Arc::new(SystemClock::new()),
        telemetry: Arc::new(TracingTelemetry::new()),
        timeouts,
    };
    let orchestrator = orchestrator(ports, oauth_providers(&config.oauth, timeouts)?);

    let mut warnings = Vec::new();
    if let Err(err) = orchestrator.provisioner().ensure_default_role().await {
        tracing::warn!(error = %err, "default role not provisioned");
        warnings.push(format!("default role not provisioned: {err}"));
    }

    Ok(AppState {
        config,
        orchestrator: Arc::new(orchestrator),
        warnings: Arc::new(warnings),
        metrics: None,
    })
}
