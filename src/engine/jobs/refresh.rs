//! Job that recomputes the global aggregate on intervals.
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::engine::AggregationEngine;
use crate::CCBT_METRICS_LOG_TARGET;

#[must_use]
#[instrument(skip(engine, cancellation_token))]
pub fn start_job(engine: &Arc<AggregationEngine>, period: Duration, cancellation_token: CancellationToken) -> JoinHandle<()> {
    let weak_engine = Arc::downgrade(engine);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                () = cancellation_token.cancelled() => {
                    tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Stopping metrics refresh job (cancelled) ...");
                    break;
                }
                _ = interval.tick() => {
                    if !refresh(&weak_engine) {
                        tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Stopping metrics refresh job (engine dropped) ...");
                        break;
                    }
                }
            }
        }
    })
}

/// Runs one refresh. Returns `false` when the engine is gone.
fn refresh(weak_engine: &Weak<AggregationEngine>) -> bool {
    let Some(engine) = weak_engine.upgrade() else {
        return false;
    };

    let start_time = Utc::now().time();

    match engine.refresh() {
        Ok(snapshot) => tracing::debug!(
            target: CCBT_METRICS_LOG_TARGET,
            download_rate = snapshot.global.download_rate,
            upload_rate = snapshot.global.upload_rate,
            torrents = snapshot.torrents,
            peers = snapshot.peers,
            "Metrics refreshed in {} ms",
            (Utc::now().time() - start_time).num_milliseconds()
        ),
        Err(error) => tracing::error!(target: CCBT_METRICS_LOG_TARGET, %error, "Metrics refresh failed"),
    }

    true
}
