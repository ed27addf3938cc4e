//! Version `1.0.0` of the configuration.
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [observability]
//! enable_metrics = true
//! metrics_bind_ip = "0.0.0.0"
//! metrics_port = 9090
//! metrics_interval = 5.0
//! inactive_peer_cleanup_interval = 60
//! max_peer_timeout = 3600
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Any value can be overridden with an env var using the
//! `CCBT_CONFIG_OVERRIDE_` prefix and `__` as section separator:
//!
//! ```text
//! CCBT_CONFIG_OVERRIDE_OBSERVABILITY__METRICS_PORT=9191
//! ```
pub mod logging;
pub mod observability;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use self::logging::Logging;
use self::observability::Observability;
use crate::{Error, Info};

/// Prefix for env vars that overwrite configuration options.
const CONFIG_OVERRIDE_PREFIX: &str = "CCBT_CONFIG_OVERRIDE_";

/// Path separator in env var names for nested values in configuration.
const CONFIG_OVERRIDE_SEPARATOR: &str = "__";

/// Core configuration for the metrics daemon.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct Configuration {
    /// Logging configuration.
    #[serde(default = "Configuration::default_logging")]
    pub logging: Logging,

    /// Metrics engine and exposition endpoint configuration.
    #[serde(default = "Configuration::default_observability")]
    pub observability: Observability,
}

impl Configuration {
    fn default_logging() -> Logging {
        Logging::default()
    }

    fn default_observability() -> Observability {
        Observability::default()
    }

    /// Loads the configuration from the `Info` struct. The whole
    /// configuration in toml format is included in the `info.config_toml`
    /// string, or read from the `info.config_toml_path` file.
    ///
    /// Configuration provided via env var has priority over config file path.
    /// A missing config file is not an error: defaults are used instead.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the environment variable does not exist or has a bad configuration.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = if let Some(config_toml) = &info.config_toml {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::string(config_toml))
        } else {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::file(&info.config_toml_path))
        };

        let figment = figment.merge(Env::prefixed(CONFIG_OVERRIDE_PREFIX).split(CONFIG_OVERRIDE_SEPARATOR));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Encodes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Will return an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string(self)?)
    }

    /// Encodes the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Will return an error if the configuration cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
