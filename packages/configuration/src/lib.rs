//! Configuration data structures for the ccBitTorrent metrics engine.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file or
//! from an env var holding the whole TOML document. Any single value can then
//! be overridden with its own env var. See [`v1_0_0`] for the file format.
//!
//! Env vars:
//!
//! - `CCBT_CONFIG_TOML`: the whole configuration as inline TOML.
//! - `CCBT_CONFIG_TOML_PATH`: path to the configuration file.
//!   Defaults to `./share/default/config/ccbt.toml`.
//! - `CCBT_CONFIG_OVERRIDE_<SECTION>__<FIELD>`: overrides a single value.
pub mod v1_0_0;

use std::env;

use thiserror::Error;

/// The current version of the configuration.
pub type Configuration = v1_0_0::Configuration;
pub type Logging = v1_0_0::logging::Logging;
pub type Threshold = v1_0_0::logging::Threshold;
pub type Observability = v1_0_0::observability::Observability;

pub use v1_0_0::logging;
pub use v1_0_0::observability;

/// The whole `ccbt.toml` file content. It has priority over the config file.
pub const ENV_VAR_CONFIG_TOML: &str = "CCBT_CONFIG_TOML";

/// The `ccbt.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "CCBT_CONFIG_TOML_PATH";

pub const DEFAULT_PATH_CONFIG: &str = "./share/default/config/ccbt.toml";

/// Information required for loading the configuration.
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Build configuration info from the process environment.
    #[must_use]
    pub fn new() -> Self {
        let config_toml = env::var(ENV_VAR_CONFIG_TOML).ok();

        if config_toml.is_some() {
            tracing::info!("Loading extra configuration from environment variable {ENV_VAR_CONFIG_TOML} ...");
        }

        let config_toml_path = env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or_else(|_| DEFAULT_PATH_CONFIG.to_owned());

        Self {
            config_toml,
            config_toml_path,
        }
    }

    /// Build configuration info from an inline TOML document.
    #[must_use]
    pub fn from_toml(config_toml: &str) -> Self {
        Self {
            config_toml: Some(config_toml.to_owned()),
            config_toml_path: DEFAULT_PATH_CONFIG.to_owned(),
        }
    }

    /// Build configuration info pointing at a TOML file.
    #[must_use]
    pub fn from_path(config_toml_path: &str) -> Self {
        Self {
            config_toml: None,
            config_toml_path: config_toml_path.to_owned(),
        }
    }
}

/// Errors that can occur when loading or encoding the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed processing the configuration: {source}")]
    ConfigError { source: Box<figment::Error> },

    #[error("Failed encoding the configuration to TOML: {source}")]
    TomlEncoding {
        #[from]
        source: toml::ser::Error,
    },

    #[error("Failed encoding the configuration to JSON: {source}")]
    JsonEncoding {
        #[from]
        source: serde_json::Error,
    },
}

impl From<figment::Error> for Error {
    #[track_caller]
    fn from(err: figment::Error) -> Self {
        Self::ConfigError { source: Box::new(err) }
    }
}
