//! Metrics collection and exposition.
//!
//! # Metrics
//! - `batch_requests_total` (counter): requests accepted on `/batch`
//! - `sink_appends_total` (counter): appends by outcome (`ok`, `error`)
//! - `sink_provision_total` (counter): provisioning calls by resource and outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_batch_request() {
    counter!("batch_requests_total").increment(1);
}

pub fn record_append(outcome: &'static str) {
    counter!("sink_appends_total", "outcome" => outcome).increment(1);
}

pub fn record_provision(resource: &'static str, outcome: &'static str) {
    counter!("sink_provision_total", "resource" => resource, "outcome" => outcome).increment(1);
}
