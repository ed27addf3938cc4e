pub mod lifecycle;
#[cfg(feature = "prometheus")]
pub mod metrics_endpoint;

use std::sync::Arc;
use std::time::Duration;

use ccbt_configuration::Configuration;
use ccbt_lib::container::AppContainer;
use ccbt_lib::engine::AggregationEngine;

/// Enough time for a few refresh ticks with the ephemeral configuration.
pub const A_FEW_TICKS: Duration = Duration::from_millis(300);

/// A started engine built the same way the daemon builds it.
pub async fn start_engine(configuration: &Configuration) -> Arc<AggregationEngine> {
    ccbt_test_helpers::logging::setup();

    let app_container = AppContainer::initialize(configuration);

    app_container.engine.start().await;

    app_container.engine.clone()
}
