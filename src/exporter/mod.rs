//! Exporter adapter.
//!
//! The engine mirrors its global aggregate into a [`MetricsExporter`] on
//! every refresh tick. Which implementation is used is decided once, when
//! the application container is built:
//!
//! - [`PrometheusExporter`](prometheus::PrometheusExporter) when metrics are
//!   enabled and the crate is built with the `prometheus` feature.
//! - [`NoopExporter`] otherwise.
//!
//! The engine itself never checks whether the metrics backend is available.
#[cfg(feature = "prometheus")]
pub mod prometheus;
#[cfg(feature = "prometheus")]
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use ccbt_clock::DurationSinceUnixEpoch;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::snapshot::GlobalMetrics;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not bind the metrics endpoint to {address}: {source}")]
    Bind { address: SocketAddr, source: std::io::Error },

    #[cfg(feature = "prometheus")]
    #[error("Could not update metric: {0}")]
    Metric(#[from] ccbt_metrics::registry::Error),

    #[error("Could not serialize metrics to JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg_attr(test, automock)]
pub trait MetricsExporter: Send + Sync {
    /// Whether this exporter publishes anything. The pull endpoint is only
    /// started for enabled exporters.
    fn is_enabled(&self) -> bool;

    /// Mirrors the global aggregate computed at `now`.
    ///
    /// # Errors
    ///
    /// Will return an error if a metric cannot be updated.
    fn sync(&self, global: &GlobalMetrics, now: DurationSinceUnixEpoch) -> Result<(), Error>;

    /// The Prometheus text exposition of the mirrored values.
    fn render_prometheus(&self) -> String;

    /// The mirrored values as JSON.
    ///
    /// # Errors
    ///
    /// Will return an error if the values cannot be serialized.
    fn render_json(&self) -> Result<String, Error>;
}

/// Exporter used when metrics are disabled or unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

impl MetricsExporter for NoopExporter {
    fn is_enabled(&self) -> bool {
        false
    }

    fn sync(&self, _global: &GlobalMetrics, _now: DurationSinceUnixEpoch) -> Result<(), Error> {
        Ok(())
    }

    fn render_prometheus(&self) -> String {
        String::new()
    }

    fn render_json(&self) -> Result<String, Error> {
        Ok("[]".to_owned())
    }
}

/// Picks the exporter for the given configuration.
#[must_use]
pub fn build(enable_metrics: bool) -> Arc<dyn MetricsExporter> {
    #[cfg(feature = "prometheus")]
    if enable_metrics {
        return Arc::new(prometheus::PrometheusExporter::new());
    }

    #[cfg(not(feature = "prometheus"))]
    if enable_metrics {
        tracing::warn!(
            target: crate::CCBT_METRICS_LOG_TARGET,
            "Metrics are enabled but the crate was built without the `prometheus` feature"
        );
    }

    Arc::new(NoopExporter)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn the_noop_exporter_should_be_disabled_and_accept_every_sync() {
        let exporter = NoopExporter;

        assert!(!exporter.is_enabled());
        assert!(exporter.sync(&GlobalMetrics::default(), Duration::ZERO).is_ok());
        assert_eq!(exporter.render_prometheus(), "");
    }

    #[test]
    fn it_should_build_a_disabled_exporter_when_metrics_are_disabled() {
        assert!(!build(false).is_enabled());
    }

    #[cfg(feature = "prometheus")]
    #[test]
    fn it_should_build_an_enabled_exporter_when_metrics_are_enabled() {
        assert!(build(true).is_enabled());
    }
}
