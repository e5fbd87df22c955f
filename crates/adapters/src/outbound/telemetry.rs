//! Telemetry adapters - Observability implementations.

use application::ports::outbound::TelemetryPort;

/// Tracing-based telemetry adapter, also feeding `metrics` counters.
#[derive(Default)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    /// Create a new [`TracingTelemetry`].
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for TracingTelemetry {
    fn record_auth_success(&self, user_id: &str, provider: &str) {
        tracing::info!(user_id, provider, "authentication successful");
        metrics::counter!(
            "popy_authentications_total",
            "provider" => provider.to_owned(),
            "outcome" => "success"
        )
        .increment(1);
    }

    fn record_auth_failure(&self, provider: &str, reason: &str) {
        tracing::info!(provider, reason, "authentication failed");
        metrics::counter!(
            "popy_authentications_total",
            "provider" => provider.to_owned(),
            "outcome" => reason.to_owned()
        )
        .increment(1);
    }

    fn record_account_created(&self, user_id: &str, provider: &str) {
        tracing::info!(user_id, provider, "account created");
        metrics::counter!(
            "popy_accounts_created_total",
            "provider" => provider.to_owned()
        )
        .increment(1);
    }
}
