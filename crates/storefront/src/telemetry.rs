//! Prometheus recorder for the metrics emitted by the cart, payment and
//! checkout crates.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{Result, StorefrontError};

/// Name of the file, inside the storage directory, that receives the
/// rendered metrics on shutdown.
pub const METRICS_FILE: &str = "metrics.prom";

/// Installs the process-wide recorder. Fails if one is already installed.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| StorefrontError::Metrics(e.to_string()))
}
