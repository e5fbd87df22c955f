//! Interface for observability.

/// Port for telemetry/observability operations.
pub trait TelemetryPort: Send + Sync {
    /// Record a successful authentication.
    fn record_auth_success(&self, user_id: &str, provider: &str);

    /// Record a failed authentication attempt.
    fn record_auth_failure(&self, provider: &str, reason: &str);

    /// Record a new account, registered or provisioned.
    fn record_account_created(&self, user_id: &str, provider: &str);
}
