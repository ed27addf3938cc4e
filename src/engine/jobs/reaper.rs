//! Job that evicts peers that stopped sending updates.
use std::sync::{Arc, Weak};
use std::time::Duration;

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
                    tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Stopping stale peer reaper job (cancelled) ...");
                    break;
                }
                _ = interval.tick() => {
                    if !reap(&weak_engine) {
                        tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Stopping stale peer reaper job (engine dropped) ...");
                        break;
                    }
                }
            }
        }
    })
}

/// Runs one eviction pass. Returns `false` when the engine is gone.
fn reap(weak_engine: &Weak<AggregationEngine>) -> bool {
    let Some(engine) = weak_engine.upgrade() else {
        return false;
    };

    let evicted = engine.reap_stale_peers();

    if evicted > 0 {
        tracing::info!(target: CCBT_METRICS_LOG_TARGET, evicted, "Stale peers evicted");
    } else {
        tracing::debug!(target: CCBT_METRICS_LOG_TARGET, "No stale peers to evict");
    }

    true
}
