//! Initialize configuration from file or env var.
//!
//! All environment variables are prefixed with `CCBT_`:
//!
//! - `CCBT_CONFIG_TOML`: the whole configuration in TOML format.
//! - `CCBT_CONFIG_TOML_PATH`: the path to the TOML config file. Defaults
//!   to `./share/default/config/ccbt.toml`.
//! - `CCBT_CONFIG_OVERRIDE_<SECTION>__<FIELD>`: overrides a single value.
use ccbt_configuration::{Configuration, Error, Info};

/// It loads the application configuration from the environment.
///
/// # Errors
///
/// Will return an error if the configuration cannot be parsed.
pub fn initialize_configuration() -> Result<Configuration, Error> {
    let info = Info::new();

    Configuration::load(&info)
}
