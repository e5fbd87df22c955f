use std::net::{Ipv4Addr, SocketAddr};

use opentelemetry::global;
use popy::{app, initialize_state, telemetry};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8080;
const OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let otlp_endpoint = std::env::var(OTLP_ENDPOINT).ok();

    // initialize logging, exported when an OTLP collector is set.
    let otlp_logs = otlp_endpoint
        .as_deref()
        .map(telemetry::setup_logging)
        .transpose()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(otlp_logs)
        .init();

    let tracer = match otlp_endpoint {
        Some(_) => {
            let provider = telemetry::setup_tracer()?;
            global::set_tracer_provider(provider.clone());
            Some(provider)
        },
        None => None,
    };

    let metrics = telemetry::setup_metrics_recorder()?;

    let mut state = initialize_state().await?;
    state.metrics = Some(metrics);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "server listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(tracer) = tracer {
        if let Err(err) = tracer.shutdown() {
            tracing::error!(error = %err, "tracer not flushed");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
