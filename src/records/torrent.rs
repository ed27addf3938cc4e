//! Per-torrent telemetry and swarm-health fields.
use std::collections::{BTreeMap, VecDeque};

use ccbt_clock::DurationSinceUnixEpoch;
use serde::{Deserialize, Serialize};

use super::{non_negative, unit_interval};
use crate::scoring;

/// Number of completion rate samples kept per torrent.
pub const COMPLETION_RATE_HISTORY_CAPACITY: usize = 60;

/// A partial update for a torrent record.
///
/// `piece_availability` holds, for every piece, how many peers have it.
/// `peer_download_speeds` holds the current download speed of every peer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentUpdate {
    pub bytes_downloaded: Option<u64>,
    pub bytes_uploaded: Option<u64>,
    pub download_rate: Option<f64>,
    pub upload_rate: Option<f64>,
    pub pieces_completed: Option<u64>,
    pub pieces_total: Option<u64>,
    pub progress: Option<f64>,
    pub connected_peers: Option<u32>,
    pub active_peers: Option<u32>,
    pub piece_availability: Option<Vec<u32>>,
    pub peer_download_speeds: Option<Vec<f64>>,
}

/// How many peers fall in each speed tier relative to the swarm mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerTierDistribution {
    pub fast: u32,
    pub medium: u32,
    pub slow: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    pub torrent_id: String,

    pub bytes_downloaded: u64,
    pub bytes_uploaded: u64,
    pub download_rate: f64,
    pub upload_rate: f64,

    pub pieces_completed: u64,
    pub pieces_total: u64,
    pub progress: f64,

    pub connected_peers: u32,
    pub active_peers: u32,

    pub start_time: DurationSinceUnixEpoch,

    /// Availability value to the number of pieces with that availability.
    pub piece_availability_distribution: BTreeMap<u32, u64>,
    pub average_piece_availability: f64,
    pub rarest_piece_availability: u32,
    pub swarm_health_score: f64,

    pub peer_performance_distribution: PeerTierDistribution,
    pub peer_download_speeds: Vec<f64>,
    pub average_peer_download_speed: f64,
    pub median_peer_download_speed: f64,
    pub fastest_peer_download_speed: f64,
    pub slowest_peer_download_speed: f64,

    /// Pieces per second since the torrent was first seen.
    pub piece_completion_rate: f64,
    /// Seconds.
    pub estimated_time_remaining: f64,
    pub pieces_per_second_history: VecDeque<f64>,

    pub swarm_efficiency: f64,
    pub peer_contribution_balance: f64,
}

impl TorrentRecord {
    #[must_use]
    pub fn new(torrent_id: &str, now: DurationSinceUnixEpoch) -> Self {
        Self {
            torrent_id: torrent_id.to_owned(),
            bytes_downloaded: 0,
            bytes_uploaded: 0,
            download_rate: 0.0,
            upload_rate: 0.0,
            pieces_completed: 0,
            pieces_total: 0,
            progress: 0.0,
            connected_peers: 0,
            active_peers: 0,
            start_time: now,
            piece_availability_distribution: BTreeMap::new(),
            average_piece_availability: 0.0,
            rarest_piece_availability: 0,
            swarm_health_score: 0.0,
            peer_performance_distribution: PeerTierDistribution::default(),
            peer_download_speeds: Vec::new(),
            average_peer_download_speed: 0.0,
            median_peer_download_speed: 0.0,
            fastest_peer_download_speed: 0.0,
            slowest_peer_download_speed: 0.0,
            piece_completion_rate: 0.0,
            estimated_time_remaining: 0.0,
            pieces_per_second_history: VecDeque::with_capacity(COMPLETION_RATE_HISTORY_CAPACITY),
            swarm_efficiency: 0.0,
            peer_contribution_balance: 0.0,
        }
    }

    /// Writes the supplied fields and recomputes the swarm scores whose
    /// inputs were part of the update.
    pub fn apply(&mut self, update: &TorrentUpdate, now: DurationSinceUnixEpoch) {
        self.write_fields(update);

        scoring::swarm::rescore(self, update, now);
    }

    fn write_fields(&mut self, update: &TorrentUpdate) {
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
        if let Some(total) = update.pieces_total {
            self.pieces_total = total;
        }
        if let Some(completed) = update.pieces_completed {
            self.pieces_completed = completed;
        }
        if self.pieces_total > 0 {
            self.pieces_completed = self.pieces_completed.min(self.pieces_total);
        }
        if let Some(peers) = update.connected_peers {
            self.connected_peers = peers;
        }
        if let Some(peers) = update.active_peers {
            self.active_peers = peers;
        }
        if let Some(speeds) = &update.peer_download_speeds {
            self.peer_download_speeds = speeds.iter().copied().map(non_negative).collect();
        }

        match update.progress {
            Some(progress) => self.progress = unit_interval(progress),
            None if self.pieces_total > 0 && (update.pieces_completed.is_some() || update.pieces_total.is_some()) => {
                #[allow(clippy::cast_precision_loss)]
                let progress = self.pieces_completed as f64 / self.pieces_total as f64;
                self.progress = unit_interval(progress);
            }
            None => {}
        }
    }

    /// Keeps the last `COMPLETION_RATE_HISTORY_CAPACITY` completion rates.
    pub(crate) fn push_completion_rate(&mut self, rate: f64) {
        if self.pieces_per_second_history.len() == COMPLETION_RATE_HISTORY_CAPACITY {
            self.pieces_per_second_history.pop_front();
        }
        self.pieces_per_second_history.push_back(rate);
    }
}
