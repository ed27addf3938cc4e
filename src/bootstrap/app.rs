//! Setup for the metrics daemon.
//!
//! It loads the configuration, initializes logging
//! and builds the application container. The engine is not started here.
use ccbt_configuration::{Configuration, Error};
use tracing::instrument;

use super::config::initialize_configuration;
use super::logging;
use crate::container::AppContainer;

/// It loads the configuration from the environment and builds the main
/// application container.
///
/// # Errors
///
/// Will return an error if the configuration cannot be loaded.
#[instrument]
pub fn setup() -> Result<(Configuration, AppContainer), Error> {
    let configuration = initialize_configuration()?;

    initialize_global_services(&configuration);

    match configuration.to_toml() {
        Ok(toml) => tracing::info!("Configuration:\n{toml}"),
        Err(error) => tracing::warn!(%error, "Could not encode the loaded configuration"),
    }

    let app_container = AppContainer::initialize(&configuration);

    Ok((configuration, app_container))
}

/// It initializes the global services. At the moment only the logging
/// subscriber.
#[instrument(skip(configuration))]
pub fn initialize_global_services(configuration: &Configuration) {
    logging::setup(configuration);
}
