//! Torrent and swarm scores.
//!
//! Each group of fields is only recomputed when the update carries one of
//! its inputs:
//!
//! | Fields | Inputs |
//! |---|---|
//! | availability histogram, average, rarest | `piece_availability` |
//! | swarm health | `piece_availability`, `active_peers` |
//! | speed distribution, contribution balance | `peer_download_speeds` |
//! | swarm efficiency | `download_rate`, `active_peers`, `peer_download_speeds` |
//! | completion forecast | `pieces_completed`, `pieces_total` |
use std::collections::BTreeMap;

use ccbt_clock::DurationSinceUnixEpoch;

use super::{mean, sample_standard_deviation};
use crate::records::torrent::{PeerTierDistribution, TorrentRecord, TorrentUpdate};
use crate::records::unit_interval;

/// Penalty applied to the swarm health when some piece has no source at all.
pub const MISSING_PIECE_PENALTY: f64 = 0.2;

/// Peers faster than this multiple of the mean speed are `fast`.
pub const FAST_PEER_FACTOR: f64 = 1.5;

/// Peers slower than this multiple of the mean speed are `slow`.
pub const SLOW_PEER_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySummary {
    pub distribution: BTreeMap<u32, u64>,
    pub average: f64,
    pub rarest: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSummary {
    pub mean: f64,
    pub median: f64,
    pub fastest: f64,
    pub slowest: f64,
    pub tiers: PeerTierDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionForecast {
    /// Pieces per second.
    pub rate: f64,
    /// Seconds.
    pub time_remaining: f64,
}

pub fn rescore(record: &mut TorrentRecord, update: &TorrentUpdate, now: DurationSinceUnixEpoch) {
    if let Some(availability) = &update.piece_availability {
        let summary = availability_summary(availability).unwrap_or_else(|| AvailabilitySummary {
            distribution: BTreeMap::new(),
            average: 0.0,
            rarest: 0,
        });

        record.piece_availability_distribution = summary.distribution;
        record.average_piece_availability = summary.average;
        record.rarest_piece_availability = summary.rarest;
    }

    if update.piece_availability.is_some() || update.active_peers.is_some() {
        record.swarm_health_score = swarm_health_score(
            record.average_piece_availability,
            record.rarest_piece_availability,
            record.active_peers,
        );
    }

    if update.peer_download_speeds.is_some() {
        let summary = speed_summary(&record.peer_download_speeds);

        record.average_peer_download_speed = summary.as_ref().map_or(0.0, |summary| summary.mean);
        record.median_peer_download_speed = summary.as_ref().map_or(0.0, |summary| summary.median);
        record.fastest_peer_download_speed = summary.as_ref().map_or(0.0, |summary| summary.fastest);
        record.slowest_peer_download_speed = summary.as_ref().map_or(0.0, |summary| summary.slowest);
        record.peer_performance_distribution = summary.map(|summary| summary.tiers).unwrap_or_default();

        record.peer_contribution_balance = contribution_balance(&record.peer_download_speeds);
    }

    if update.download_rate.is_some() || update.active_peers.is_some() || update.peer_download_speeds.is_some() {
        if let Some(efficiency) = swarm_efficiency(record.download_rate, record.active_peers, record.average_peer_download_speed)
        {
            record.swarm_efficiency = efficiency;
        }
    }

    if update.pieces_completed.is_some() || update.pieces_total.is_some() {
        let elapsed = now.saturating_sub(record.start_time);

        if let Some(forecast) = completion_forecast(record.pieces_completed, record.pieces_total, elapsed) {
            record.piece_completion_rate = forecast.rate;
            record.estimated_time_remaining = forecast.time_remaining;
            record.push_completion_rate(forecast.rate);
        }
    }
}

/// Histogram, mean and minimum of the per-piece availability. `None` for a
/// torrent without pieces.
#[must_use]
pub fn availability_summary(availability: &[u32]) -> Option<AvailabilitySummary> {
    let rarest = *availability.iter().min()?;

    let mut distribution = BTreeMap::new();
    for peers in availability {
        *distribution.entry(*peers).or_insert(0) += 1;
    }

    let values: Vec<f64> = availability.iter().copied().map(f64::from).collect();

    Some(AvailabilitySummary {
        distribution,
        average: mean(&values)?,
        rarest,
    })
}

/// Average availability per active peer, penalized when a piece is missing
/// from the whole swarm. Zero without active peers.
#[must_use]
pub fn swarm_health_score(average_piece_availability: f64, rarest_piece_availability: u32, active_peers: u32) -> f64 {
    if active_peers == 0 {
        return 0.0;
    }

    let ratio = average_piece_availability / f64::from(active_peers);
    let penalty = if rarest_piece_availability == 0 {
        MISSING_PIECE_PENALTY
    } else {
        0.0
    };

    unit_interval(ratio * (1.0 - penalty))
}

/// Mean, median (lower middle on even counts), extremes and tiers of the
/// peer speeds. `None` for an empty swarm.
#[must_use]
pub fn speed_summary(speeds: &[f64]) -> Option<SpeedSummary> {
    let mean = mean(speeds)?;

    let mut sorted = speeds.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut tiers = PeerTierDistribution::default();
    for speed in speeds {
        if *speed > FAST_PEER_FACTOR * mean {
            tiers.fast += 1;
        } else if *speed < SLOW_PEER_FACTOR * mean {
            tiers.slow += 1;
        } else {
            tiers.medium += 1;
        }
    }

    Some(SpeedSummary {
        mean,
        median: sorted[(sorted.len() - 1) / 2],
        fastest: sorted[sorted.len() - 1],
        slowest: sorted[0],
        tiers,
    })
}

/// Pieces per second since the torrent was first seen and the time left at
/// that pace. `None` before any time has elapsed or without a known total.
#[must_use]
pub fn completion_forecast(pieces_completed: u64, pieces_total: u64, elapsed: DurationSinceUnixEpoch) -> Option<CompletionForecast> {
    let elapsed = elapsed.as_secs_f64();

    if pieces_total == 0 || elapsed <= 0.0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let rate = pieces_completed as f64 / elapsed;

    #[allow(clippy::cast_precision_loss)]
    let remaining = pieces_total.saturating_sub(pieces_completed) as f64;

    let time_remaining = if rate > 0.0 { remaining / rate } else { 0.0 };

    Some(CompletionForecast { rate, time_remaining })
}

/// Download rate against what the active peers could deliver at the average
/// peer speed. `None` without active peers or without download.
#[must_use]
pub fn swarm_efficiency(download_rate: f64, active_peers: u32, average_peer_download_speed: f64) -> Option<f64> {
    if active_peers == 0 || download_rate <= 0.0 {
        return None;
    }

    let theoretical_max = if average_peer_download_speed > 0.0 {
        f64::from(active_peers) * average_peer_download_speed
    } else {
        download_rate
    };

    if theoretical_max <= 0.0 {
        return Some(0.0);
    }

    Some(unit_interval(download_rate / theoretical_max))
}

/// One minus the coefficient of variation of the peer speeds, floored at
/// zero. A single peer is perfectly balanced; no peers score zero.
#[must_use]
pub fn contribution_balance(speeds: &[f64]) -> f64 {
    match speeds.len() {
        0 => 0.0,
        1 => 1.0,
        _ => {
            let (Some(mean), Some(deviation)) = (mean(speeds), sample_standard_deviation(speeds)) else {
                return 0.0;
            };

            let coefficient_of_variation = if mean > 0.0 { deviation / mean } else { 0.0 };

            unit_interval(1.0 - coefficient_of_variation.min(1.0))
        }
    }
}
