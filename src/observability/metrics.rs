//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_requests_total` (counter): probes by outcome (`success` or error type)
//! - `probe_duration_seconds` (histogram): wall-clock time per GET, gate check included
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - Exporter failure is logged, never fatal

use std::net::SocketAddr;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome and duration of one probe request.
pub fn record_probe(outcome: &'static str, started: Instant) {
    ::metrics::counter!("probe_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("probe_duration_seconds").record(started.elapsed().as_secs_f64());
}
