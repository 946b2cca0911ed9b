//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ldap_config_mutations_total` (counter): registry mutations by facet, op, outcome
//! - `ldap_authenticator_reloads_total` (counter): authenticator reloads by outcome
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when metrics are disabled.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::registry::Facet;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_mutation(facet: Facet, op: &'static str, outcome: &'static str) {
    metrics::counter!(
        "ldap_config_mutations_total",
        "facet" => facet.as_str(),
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_reload(outcome: &'static str) {
    metrics::counter!("ldap_authenticator_reloads_total", "outcome" => outcome).increment(1);
}
