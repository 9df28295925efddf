//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_requests_total` (counter): requests by outcome and status
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder, so library users and tests pay nothing.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome of a request passing through the gatekeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    TlsRejected,
    MethodRejected,
    DeliveryFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Delivered => "delivered",
            Outcome::TlsRejected => "tls_rejected",
            Outcome::MethodRejected => "method_rejected",
            Outcome::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one request.
pub fn record_outcome(outcome: Outcome, status: u16) {
    metrics::counter!(
        "gatekeeper_requests_total",
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
}
