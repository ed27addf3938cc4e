//! ccBitTorrent metrics daemon.
//!
//! The application loads the configuration, builds the shared services and
//! starts the aggregation engine:
//!
//! - The refresh job: recomputes the global aggregate on intervals.
//! - The reaper job: evicts peers that stopped sending telemetry.
//! - The metrics endpoint, when `observability.enable_metrics` is set.
use std::sync::Arc;

use ccbt_configuration::{Configuration, Error};
use tracing::instrument;

use crate::bootstrap;
use crate::container::AppContainer;

/// Loads the configuration and starts the engine.
///
/// # Errors
///
/// Will return an error if the configuration cannot be loaded.
pub async fn run() -> Result<Arc<AppContainer>, Error> {
    let (config, app_container) = bootstrap::app::setup()?;

    let app_container = Arc::new(app_container);

    start(&config, &app_container).await;

    Ok(app_container)
}

/// Starts the engine jobs.
#[instrument(skip(config, app_container))]
pub async fn start(config: &Configuration, app_container: &Arc<AppContainer>) {
    if !config.observability.enable_metrics {
        tracing::warn!("Metrics endpoint disabled in configuration");
    }

    app_container.engine.start().await;
}
