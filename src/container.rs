use std::sync::Arc;

use ccbt_configuration::Configuration;

use crate::engine::AggregationEngine;
use crate::exporter::{self, MetricsExporter};

/// The services shared by the whole daemon.
pub struct AppContainer {
    pub configuration: Arc<Configuration>,
    pub exporter: Arc<dyn MetricsExporter>,
    pub engine: Arc<AggregationEngine>,
}

impl AppContainer {
    #[must_use]
    pub fn initialize(configuration: &Configuration) -> AppContainer {
        let configuration = Arc::new(configuration.clone());

        let exporter = exporter::build(configuration.observability.enable_metrics);

        let engine = Arc::new(AggregationEngine::new(&configuration.observability, exporter.clone()));

        AppContainer {
            configuration,
            exporter,
            engine,
        }
    }
}
