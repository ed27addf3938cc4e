//! Configurations for tests.
use std::net::{IpAddr, Ipv4Addr};

use ccbt_configuration::{Configuration, Threshold};

/// A configuration suitable for running the engine in tests:
///
/// - The exposition endpoint is enabled and bound to `127.0.0.1` on a port
///   chosen by the OS, so tests can run in parallel.
/// - The refresh loop ticks every 50 milliseconds.
/// - Logging is kept quiet.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration::default();

    config.logging.threshold = Threshold::Off;

    config.observability.enable_metrics = true;
    config.observability.metrics_bind_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.observability.metrics_port = 0;
    config.observability.metrics_interval = 0.05;

    config
}

/// Ephemeral configuration with the exposition endpoint disabled.
#[must_use]
pub fn ephemeral_with_metrics_disabled() -> Configuration {
    let mut config = ephemeral();

    config.observability.enable_metrics = false;

    config
}

/// Ephemeral configuration whose endpoint binds to the given port.
#[must_use]
pub fn ephemeral_with_metrics_port(port: u16) -> Configuration {
    let mut config = ephemeral();

    config.observability.metrics_port = port;

    config
}
