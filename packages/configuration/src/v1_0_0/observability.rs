use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the metrics aggregation engine and its pull endpoint.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Observability {
    /// Whether the Prometheus exposition endpoint should be started.
    ///
    /// The engine aggregates and scores telemetry regardless of this flag.
    #[serde(default = "Observability::default_enable_metrics")]
    pub enable_metrics: bool,

    /// The IP the exposition endpoint binds to. Use `0.0.0.0` to listen on
    /// all interfaces.
    #[serde(default = "Observability::default_metrics_bind_ip")]
    pub metrics_bind_ip: IpAddr,

    /// The port the exposition endpoint binds to. Use port `0` to let the
    /// operating system choose a free port.
    #[serde(default = "Observability::default_metrics_port")]
    pub metrics_port: u16,

    /// Seconds between two refreshes of the global aggregate.
    #[serde(default = "Observability::default_metrics_interval")]
    pub metrics_interval: f64,

    /// Seconds between two runs of the stale peer reaper.
    #[serde(default = "Observability::default_inactive_peer_cleanup_interval")]
    pub inactive_peer_cleanup_interval: u64,

    /// Seconds without updates after which a peer record is evicted.
    #[serde(default = "Observability::default_max_peer_timeout")]
    pub max_peer_timeout: u64,
}

impl Default for Observability {
    fn default() -> Self {
        Self {
            enable_metrics: Self::default_enable_metrics(),
            metrics_bind_ip: Self::default_metrics_bind_ip(),
            metrics_port: Self::default_metrics_port(),
            metrics_interval: Self::default_metrics_interval(),
            inactive_peer_cleanup_interval: Self::default_inactive_peer_cleanup_interval(),
            max_peer_timeout: Self::default_max_peer_timeout(),
        }
    }
}

impl Observability {
    fn default_enable_metrics() -> bool {
        false
    }

    fn default_metrics_bind_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    fn default_metrics_port() -> u16 {
        9090
    }

    fn default_metrics_interval() -> f64 {
        5.0
    }

    fn default_inactive_peer_cleanup_interval() -> u64 {
        60
    }

    fn default_max_peer_timeout() -> u64 {
        3600
    }

    /// The socket address of the exposition endpoint.
    #[must_use]
    pub fn metrics_bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.metrics_bind_ip, self.metrics_port)
    }

    /// The refresh period.
    ///
    /// Values that are not a positive, finite number of seconds fall back to
    /// the default interval.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.metrics_interval)
            .ok()
            .filter(|interval| !interval.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(Self::default_metrics_interval()))
    }

    /// The reaper period. A zero interval is raised to one second.
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.inactive_peer_cleanup_interval.max(1))
    }

    /// Peers not updated for longer than this are considered stale.
    #[must_use]
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.max_peer_timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Observability;

    #[test]
    fn it_should_use_the_configured_refresh_interval() {
        let config = Observability {
            metrics_interval: 0.5,
            ..Default::default()
        };

        assert_eq!(config.refresh_interval(), Duration::from_millis(500));
    }

    #[test]
    fn it_should_fall_back_to_the_default_refresh_interval_for_invalid_values() {
        for invalid in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = Observability {
                metrics_interval: invalid,
                ..Default::default()
            };

            assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        }
    }

    #[test]
    fn it_should_never_use_a_zero_cleanup_interval() {
        let config = Observability {
            inactive_peer_cleanup_interval: 0,
            ..Default::default()
        };

        assert_eq!(config.cleanup_interval(), Duration::from_secs(1));
    }

    #[test]
    fn it_should_build_the_endpoint_bind_address() {
        let config = Observability::default();

        assert_eq!(config.metrics_bind_address().to_string(), "0.0.0.0:9090");
    }
}
