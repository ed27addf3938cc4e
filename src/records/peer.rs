//! Per-peer telemetry.
use std::collections::BTreeMap;

use ccbt_clock::DurationSinceUnixEpoch;
use serde::{Deserialize, Serialize};

use super::{non_negative, unit_interval};
use crate::scoring;

/// Direction of a peer's download rate relative to its own peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTrend {
    Improving,
    #[default]
    Stable,
    Degrading,
}

/// A partial update for a peer record.
///
/// `piece_download_speed` and `piece_download_time` are merged into the
/// record's maps, one entry per piece index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerUpdate {
    pub bytes_downloaded: Option<u64>,
    pub bytes_uploaded: Option<u64>,
    pub download_rate: Option<f64>,
    pub upload_rate: Option<f64>,
    pub request_latency: Option<f64>,
    pub consecutive_failures: Option<u32>,
    pub connection_duration: Option<f64>,
    pub pieces_served: Option<u64>,
    pub pieces_received: Option<u64>,
    pub piece_download_speed: BTreeMap<u32, f64>,
    pub piece_download_time: BTreeMap<u32, f64>,
    pub success_rate: Option<f64>,
    pub efficiency_score: Option<f64>,
    pub connection_quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub peer_key: String,

    pub bytes_downloaded: u64,
    pub bytes_uploaded: u64,

    /// Bytes per second.
    pub download_rate: f64,
    /// Bytes per second.
    pub upload_rate: f64,

    /// Seconds.
    pub request_latency: f64,
    pub consecutive_failures: u32,
    /// Seconds.
    pub connection_duration: f64,
    pub pieces_served: u64,
    pub pieces_received: u64,

    /// Piece index to bytes per second.
    pub piece_download_speed: BTreeMap<u32, f64>,
    /// Piece index to seconds.
    pub piece_download_time: BTreeMap<u32, f64>,

    pub pieces_per_second: f64,
    pub bytes_per_connection: u64,
    pub efficiency_score: f64,
    pub bandwidth_utilization: f64,
    pub connection_quality_score: f64,
    pub error_rate: f64,
    pub success_rate: f64,
    pub average_block_latency: f64,

    pub peak_download_rate: f64,
    pub peak_upload_rate: f64,
    pub performance_trend: PerformanceTrend,

    pub last_activity: DurationSinceUnixEpoch,
}

impl PeerRecord {
    #[must_use]
    pub fn new(peer_key: &str, now: DurationSinceUnixEpoch) -> Self {
        Self {
            peer_key: peer_key.to_owned(),
            bytes_downloaded: 0,
            bytes_uploaded: 0,
            download_rate: 0.0,
            upload_rate: 0.0,
            request_latency: 0.0,
            consecutive_failures: 0,
            connection_duration: 0.0,
            pieces_served: 0,
            pieces_received: 0,
            piece_download_speed: BTreeMap::new(),
            piece_download_time: BTreeMap::new(),
            pieces_per_second: 0.0,
            bytes_per_connection: 0,
            efficiency_score: 0.0,
            bandwidth_utilization: 0.0,
            connection_quality_score: 0.0,
            error_rate: 0.0,
            success_rate: 1.0,
            average_block_latency: 0.0,
            peak_download_rate: 0.0,
            peak_upload_rate: 0.0,
            performance_trend: PerformanceTrend::Stable,
            last_activity: now,
        }
    }

    /// Writes the supplied fields, recomputes the derived scores and stamps
    /// the activity time. `last_activity` never moves backwards.
    pub fn apply(&mut self, update: &PeerUpdate, now: DurationSinceUnixEpoch) {
        self.write_fields(update);

        scoring::peer::rescore(self, update);

        self.last_activity = self.last_activity.max(now);
    }

    /// Time elapsed since the last update, as seen at `now`.
    #[must_use]
    pub fn idle_for(&self, now: DurationSinceUnixEpoch) -> DurationSinceUnixEpoch {
        now.saturating_sub(self.last_activity)
    }

    fn write_fields(&mut self, update: &PeerUpdate) {
        if let Some(bytes) = update.bytes_downloaded {
            self.bytes_downloaded = bytes;
        }
        if let Some(bytes) = update.bytes_uploaded {
            self.bytes_uploaded = bytes;
        }
        if let Some(rate) = update.download_rate {
            self.download_rate = non_negative(rate);
        }
        if let Some(rate) = update.upload_rate {
            self.upload_rate = non_negative(rate);
        }
        if let Some(latency) = update.request_latency {
            self.request_latency = non_negative(latency);
        }
        if let Some(failures) = update.consecutive_failures {
            self.consecutive_failures = failures;
        }
        if let Some(duration) = update.connection_duration {
            self.connection_duration = non_negative(duration);
        }
        if let Some(pieces) = update.pieces_served {
            self.pieces_served = pieces;
        }
        if let Some(pieces) = update.pieces_received {
            self.pieces_received = pieces;
        }
        if let Some(success_rate) = update.success_rate {
            self.success_rate = unit_interval(success_rate);
        }

        for (piece, speed) in &update.piece_download_speed {
            self.piece_download_speed.insert(*piece, non_negative(*speed));
        }
        for (piece, seconds) in &update.piece_download_time {
            self.piece_download_time.insert(*piece, non_negative(*seconds));
        }
    }
}
