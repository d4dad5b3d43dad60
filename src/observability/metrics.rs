//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirector_navigations_total` (counter): navigations seen, by outcome
//!   (`redirected`, `no_match`, `excluded`)
//! - `redirector_redirects_total` (counter): redirects, by match kind
//! - `redirector_store_errors_total` (counter): store failures, by operation
//!
//! # Design Decisions
//! - Prometheus exporter is optional and off by default
//! - Labels are static strings only

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_navigation(outcome: &'static str) {
    metrics::counter!("redirector_navigations_total", "outcome" => outcome).increment(1);
}

pub fn record_redirect(kind: &'static str) {
    metrics::counter!("redirector_redirects_total", "kind" => kind).increment(1);
}

pub fn record_store_error(op: &'static str) {
    metrics::counter!("redirector_store_errors_total", "op" => op).increment(1);
}
