//! ccBitTorrent metrics aggregation and swarm-health scoring engine.
//!
//! Producers (the peer wire layer, the piece manager, the DHT) push partial
//! telemetry into the [`AggregationEngine`](engine::AggregationEngine) with
//! `update_peer` and `update_torrent`. Each call upserts a record and
//! recomputes its derived scores synchronously:
//!
//! - Peers: peak rates, performance trend, efficiency, connection quality,
//!   bandwidth utilization, error rate and throughput in pieces per second.
//! - Torrents: piece availability histogram, swarm health, peer speed
//!   distribution, contribution balance, swarm efficiency and a completion
//!   forecast.
//!
//! Two background jobs run while the engine is started:
//!
//! - The refresh job blends the rate history with the live torrent rates,
//!   appends a sample to a ring buffer of 60 samples, notifies the optional
//!   subscriber and mirrors the global aggregate into the exporter.
//! - The reaper job evicts peers that have not been updated for longer than
//!   the configured timeout.
//!
//! When metrics are enabled the exporter serves the Prometheus text
//! exposition on `GET /metrics`:
//!
//! ```text
//! ccbt_download_rate_bytes_per_second   gauge
//! ccbt_upload_rate_bytes_per_second     gauge
//! ccbt_bytes_downloaded_total           counter
//! ccbt_bytes_uploaded_total             counter
//! ```
//!
//! A JSON snapshot is always available through `export_json`.
pub mod app;
pub mod bootstrap;
pub mod container;
pub mod engine;
pub mod exporter;
pub mod rates;
pub mod records;
pub mod scoring;
pub mod snapshot;

use ccbt_clock::clock;

/// Log target for every line emitted by the engine.
pub const CCBT_METRICS_LOG_TARGET: &str = "CCBT_METRICS";

/// Working version, for production.
#[cfg(not(test))]
pub type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub type CurrentClock = clock::Stopped;
