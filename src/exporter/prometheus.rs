//! Exporter backed by a `ccbt_metrics` registry.
use std::sync::{PoisonError, RwLock};

use ccbt_clock::DurationSinceUnixEpoch;
use ccbt_metrics::metric::name::MetricName;
use ccbt_metrics::metric_name;
use ccbt_metrics::prometheus::PrometheusSerializable;
use ccbt_metrics::registry::MetricRegistry;
use ccbt_metrics::unit::Unit;
use serde::Serialize;

use super::{Error, MetricsExporter};
use crate::snapshot::GlobalMetrics;

pub const DOWNLOAD_RATE: &str = "ccbt_download_rate_bytes_per_second";
pub const UPLOAD_RATE: &str = "ccbt_upload_rate_bytes_per_second";
pub const BYTES_DOWNLOADED_TOTAL: &str = "ccbt_bytes_downloaded_total";
pub const BYTES_UPLOADED_TOTAL: &str = "ccbt_bytes_uploaded_total";

#[derive(Debug, Default)]
struct State {
    registry: MetricRegistry,
    last_synced_at: Option<DurationSinceUnixEpoch>,
}

#[derive(Serialize)]
struct JsonView<'a> {
    /// Seconds since the Unix Epoch.
    last_synced_at: Option<u64>,
    metrics: &'a MetricRegistry,
}

#[derive(Debug)]
pub struct PrometheusExporter {
    state: RwLock<State>,
}

impl Default for PrometheusExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusExporter {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = MetricRegistry::default();

        registry.describe_gauge(
            &metric_name!(DOWNLOAD_RATE),
            Unit::BytesPerSecond,
            "Current blended global download rate.",
        );
        registry.describe_gauge(
            &metric_name!(UPLOAD_RATE),
            Unit::BytesPerSecond,
            "Current blended global upload rate.",
        );
        registry.describe_counter(
            &metric_name!(BYTES_DOWNLOADED_TOTAL),
            Unit::Bytes,
            "Cumulative global bytes downloaded.",
        );
        registry.describe_counter(
            &metric_name!(BYTES_UPLOADED_TOTAL),
            Unit::Bytes,
            "Cumulative global bytes uploaded.",
        );

        Self {
            state: RwLock::new(State {
                registry,
                last_synced_at: None,
            }),
        }
    }
}

impl MetricsExporter for PrometheusExporter {
    fn is_enabled(&self) -> bool {
        true
    }

    fn sync(&self, global: &GlobalMetrics, now: DurationSinceUnixEpoch) -> Result<(), Error> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        state.registry.set_gauge(&MetricName::new(DOWNLOAD_RATE), global.download_rate)?;
        state.registry.set_gauge(&MetricName::new(UPLOAD_RATE), global.upload_rate)?;
        state
            .registry
            .observe_counter_total(&MetricName::new(BYTES_DOWNLOADED_TOTAL), global.bytes_downloaded)?;
        state
            .registry
            .observe_counter_total(&MetricName::new(BYTES_UPLOADED_TOTAL), global.bytes_uploaded)?;

        state.last_synced_at = Some(now);

        Ok(())
    }

    fn render_prometheus(&self) -> String {
        self.state.read().unwrap_or_else(PoisonError::into_inner).registry.to_prometheus()
    }

    fn render_json(&self) -> Result<String, Error> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let view = JsonView {
            last_synced_at: state.last_synced_at.map(|timestamp| timestamp.as_secs()),
            metrics: &state.registry,
        };

        Ok(serde_json::to_string_pretty(&view)?)
    }
}
