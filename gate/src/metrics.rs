//! Gate metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticket_gate_verifications_total{verdict}` - Verdicts returned by the engine
//! - `ticket_gate_check_ins_total{outcome}` - Check-in attempts by outcome
//! - `ticket_gate_registry_retries_total{operation}` - Retried registry calls
//! - `ticket_gate_tickets_issued_total` - Tickets recorded by the SQL registry
//!
//! ## Histograms
//! - `ticket_gate_registry_query_duration_seconds{operation}` - SQL registry latency

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Register all metric descriptions.
///
/// Call once at startup, before any metric is recorded.
pub fn register_gate_metrics() {
    describe_counter!(
        "ticket_gate_verifications_total",
        "Verdicts returned by the verification engine (valid, already_used, not_found, malformed_input, registry_unavailable)"
    );
    describe_counter!(
        "ticket_gate_check_ins_total",
        "Check-in attempts by outcome (checked_in, already_used, not_found, registry_unavailable)"
    );
    describe_counter!(
        "ticket_gate_registry_retries_total",
        "Registry calls retried after a transient failure"
    );
    describe_counter!(
        "ticket_gate_tickets_issued_total",
        "Tickets recorded in the PostgreSQL registry"
    );
    describe_histogram!(
        "ticket_gate_registry_query_duration_seconds",
        "Time taken by PostgreSQL registry queries"
    );

    tracing::info!("Gate metrics registered");
}

/// Install the Prometheus recorder and serve `/metrics` on `address`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns [`BuildError`] if a recorder is already installed or the
/// listener cannot be set up.
pub fn install_prometheus_exporter(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    register_gate_metrics();
    tracing::info!(%address, "Prometheus metrics available at /metrics");
    Ok(())
}
