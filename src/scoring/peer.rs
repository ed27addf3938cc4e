//! Peer scores.
//!
//! | Score | Formula |
//! |---|---|
//! | efficiency | `min(1, ((down + up) / duration) / max(peak_down + peak_up, 1))` |
//! | connection quality | `0.4 * success + 0.3 * min(1, rate / 10 MiB/s) + 0.3 * max(0, 1 - latency / 1 s)` |
//! | bandwidth utilization | `min(1, (rate_down + rate_up) / max(peak_down + peak_up, 1))` |
//! | error rate | `failures / (pieces_received + failures)` |
use super::mean;
use crate::records::peer::{PeerRecord, PeerUpdate, PerformanceTrend};
use crate::records::unit_interval;

/// Download rate at which the rate component of the connection quality saturates.
pub const REFERENCE_DOWNLOAD_RATE: f64 = 10.0 * 1024.0 * 1024.0;

/// Request latency, in seconds, at which the latency component drops to zero.
pub const REFERENCE_LATENCY: f64 = 1.0;

pub const SUCCESS_WEIGHT: f64 = 0.4;
pub const RATE_WEIGHT: f64 = 0.3;
pub const LATENCY_WEIGHT: f64 = 0.3;

/// At or above this share of the peak download rate the trend is improving.
pub const IMPROVING_THRESHOLD: f64 = 0.9;

/// At or above this share of the peak download rate the trend is stable.
pub const STABLE_THRESHOLD: f64 = 0.7;

/// Recomputes every derived field of the record from its current state.
///
/// Scores supplied in the update are taken as given (clamped) instead of
/// being recomputed.
pub fn rescore(record: &mut PeerRecord, update: &PeerUpdate) {
    record.peak_download_rate = record.peak_download_rate.max(record.download_rate);
    record.peak_upload_rate = record.peak_upload_rate.max(record.upload_rate);

    record.performance_trend = performance_trend(record.download_rate, record.peak_download_rate, record.performance_trend);

    let total_bytes = record.bytes_downloaded.saturating_add(record.bytes_uploaded);
    let peak_sum = rate_sum(record.peak_download_rate, record.peak_upload_rate);

    match update.efficiency_score {
        Some(supplied) => record.efficiency_score = unit_interval(supplied),
        None => {
            if let Some(score) = efficiency_score(total_bytes, record.connection_duration, peak_sum) {
                record.efficiency_score = score;
            }
        }
    }

    record.connection_quality_score = match update.connection_quality_score {
        Some(supplied) => unit_interval(supplied),
        None => connection_quality_score(record.success_rate, record.download_rate, record.request_latency),
    };

    if let Some(pieces_per_second) = pieces_per_second(record.pieces_received, record.connection_duration) {
        record.pieces_per_second = pieces_per_second;
    }

    record.bytes_per_connection = total_bytes;
    record.bandwidth_utilization = bandwidth_utilization(rate_sum(record.download_rate, record.upload_rate), peak_sum);
    record.error_rate = error_rate(record.consecutive_failures, record.pieces_received);

    if let Some(latency) = average_block_latency(&record.piece_download_time.values().copied().collect::<Vec<_>>()) {
        record.average_block_latency = latency;
    }
}

/// Sum of two finite rates, saturated at `f64::MAX` so ratios between sums
/// stay defined.
fn rate_sum(first: f64, second: f64) -> f64 {
    (first + second).min(f64::MAX)
}

/// A zero download rate carries no signal, so the previous trend is kept.
#[must_use]
pub fn performance_trend(download_rate: f64, peak_download_rate: f64, previous: PerformanceTrend) -> PerformanceTrend {
    if download_rate <= 0.0 {
        previous
    } else if download_rate >= IMPROVING_THRESHOLD * peak_download_rate {
        PerformanceTrend::Improving
    } else if download_rate >= STABLE_THRESHOLD * peak_download_rate {
        PerformanceTrend::Stable
    } else {
        PerformanceTrend::Degrading
    }
}

/// `None` when the connection has no duration yet or has moved no bytes.
#[must_use]
pub fn efficiency_score(total_bytes: u64, connection_duration: f64, peak_rate_sum: f64) -> Option<f64> {
    if connection_duration <= 0.0 || total_bytes == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let average_rate = total_bytes as f64 / connection_duration;

    Some(unit_interval(average_rate / peak_rate_sum.max(1.0)))
}

#[must_use]
pub fn connection_quality_score(success_rate: f64, download_rate: f64, request_latency: f64) -> f64 {
    let normalized_rate = (download_rate / REFERENCE_DOWNLOAD_RATE).min(1.0);
    let normalized_latency = (1.0 - request_latency / REFERENCE_LATENCY).max(0.0);

    unit_interval(
        unit_interval(success_rate) * SUCCESS_WEIGHT + normalized_rate * RATE_WEIGHT + normalized_latency * LATENCY_WEIGHT,
    )
}

#[must_use]
pub fn pieces_per_second(pieces_received: u64, connection_duration: f64) -> Option<f64> {
    if connection_duration <= 0.0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let pieces = pieces_received as f64;

    Some(pieces / connection_duration)
}

#[must_use]
pub fn bandwidth_utilization(current_rate_sum: f64, peak_rate_sum: f64) -> f64 {
    unit_interval(current_rate_sum / peak_rate_sum.max(1.0))
}

/// Share of failed requests among all finished ones. Zero when nothing has
/// finished yet.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn error_rate(consecutive_failures: u32, pieces_received: u64) -> f64 {
    let failures = u64::from(consecutive_failures);
    let attempts = pieces_received.saturating_add(failures);

    if attempts == 0 {
        return 0.0;
    }

    failures as f64 / attempts as f64
}

#[must_use]
pub fn average_block_latency(piece_download_times: &[f64]) -> Option<f64> {
    mean(piece_download_times)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn apply(record: &mut PeerRecord, update: PeerUpdate) {
        record.apply(&update, Duration::from_secs(1));
    }

    mod the_connection_quality {
        use super::*;

        #[test]
        fn it_should_weigh_success_rate_and_latency() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(2_097_152.0),
                    upload_rate: Some(0.0),
                    request_latency: Some(0.01),
                    success_rate: Some(1.0),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.connection_quality_score, 0.757, epsilon = 1e-6);
        }

        #[test]
        fn it_should_saturate_the_rate_component() {
            assert_relative_eq!(connection_quality_score(1.0, 1e12, 0.0), 1.0);
        }

        #[test]
        fn it_should_not_go_below_zero_with_a_huge_latency() {
            assert_relative_eq!(connection_quality_score(0.0, 0.0, 1e9), 0.0);
        }

        #[test]
        fn it_should_keep_a_supplied_score() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(2_097_152.0),
                    connection_quality_score: Some(0.25),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.connection_quality_score, 0.25);
        }
    }

    mod the_performance_trend {
        use super::*;

        #[rstest]
        #[case(95.0, PerformanceTrend::Improving)]
        #[case(90.0, PerformanceTrend::Improving)]
        #[case(80.0, PerformanceTrend::Stable)]
        #[case(70.0, PerformanceTrend::Stable)]
        #[case(50.0, PerformanceTrend::Degrading)]
        fn it_should_classify_the_rate_against_the_peak(#[case] rate: f64, #[case] expected: PerformanceTrend) {
            assert_eq!(performance_trend(rate, 100.0, PerformanceTrend::Stable), expected);
        }

        #[test]
        fn it_should_keep_the_previous_trend_when_the_rate_is_zero() {
            assert_eq!(
                performance_trend(0.0, 100.0, PerformanceTrend::Degrading),
                PerformanceTrend::Degrading
            );
        }

        #[test]
        fn it_should_degrade_when_the_rate_falls_well_below_the_peak() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(1000.0),
                    ..Default::default()
                },
            );
            assert_eq!(record.performance_trend, PerformanceTrend::Improving);

            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(300.0),
                    ..Default::default()
                },
            );
            assert_eq!(record.performance_trend, PerformanceTrend::Degrading);
            assert_relative_eq!(record.peak_download_rate, 1000.0);
        }
    }

    mod the_efficiency {
        use super::*;

        #[test]
        fn it_should_compare_the_average_rate_with_the_peaks() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    bytes_downloaded: Some(5_000),
                    bytes_uploaded: Some(1_000),
                    download_rate: Some(200.0),
                    connection_duration: Some(60.0),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.efficiency_score, 0.5);
        }

        #[test]
        fn it_should_not_be_computed_without_a_duration() {
            assert_eq!(efficiency_score(1_000, 0.0, 10.0), None);
            assert_eq!(efficiency_score(0, 10.0, 10.0), None);
        }

        #[test]
        fn it_should_be_capped_at_one() {
            assert_relative_eq!(efficiency_score(u64::MAX, 1e-9, 0.0).unwrap(), 1.0);
        }

        #[test]
        fn it_should_keep_a_supplied_score_clamped() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    bytes_downloaded: Some(5_000),
                    connection_duration: Some(60.0),
                    efficiency_score: Some(3.0),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.efficiency_score, 1.0);
        }
    }

    mod the_other_derived_fields {
        use std::collections::BTreeMap;

        use super::*;

        #[test]
        fn it_should_compute_the_throughput_in_pieces() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    pieces_received: Some(30),
                    connection_duration: Some(10.0),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.pieces_per_second, 3.0);
        }

        #[test]
        fn it_should_compute_the_error_rate() {
            assert_relative_eq!(error_rate(1, 3), 0.25);
            assert_relative_eq!(error_rate(0, 0), 0.0);
        }

        #[test]
        fn it_should_compute_the_bandwidth_utilization() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(400.0),
                    upload_rate: Some(100.0),
                    ..Default::default()
                },
            );
            apply(
                &mut record,
                PeerUpdate {
                    download_rate: Some(200.0),
                    upload_rate: Some(50.0),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.bandwidth_utilization, 0.5);
        }

        #[test]
        fn it_should_average_the_block_latency() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    piece_download_time: BTreeMap::from([(0, 1.0), (1, 3.0)]),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.average_block_latency, 2.0);
        }

        #[test]
        fn it_should_count_both_directions_in_the_bytes_per_connection() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    bytes_downloaded: Some(7),
                    bytes_uploaded: Some(3),
                    ..Default::default()
                },
            );

            assert_eq!(record.bytes_per_connection, 10);
        }
    }

    mod for_pathological_inputs {
        use super::*;

        #[rstest]
        #[case(f64::MAX, f64::MAX, 0.0, u64::MAX)]
        #[case(0.0, 0.0, f64::MAX, 0)]
        #[case(-1.0, f64::NAN, f64::INFINITY, 1)]
        #[case(1e-300, 1e300, 1e-300, u64::MAX)]
        fn it_should_keep_every_score_within_the_unit_interval(
            #[case] download_rate: f64,
            #[case] upload_rate: f64,
            #[case] connection_duration: f64,
            #[case] bytes: u64,
        ) {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    bytes_downloaded: Some(bytes),
                    bytes_uploaded: Some(bytes),
                    download_rate: Some(download_rate),
                    upload_rate: Some(upload_rate),
                    connection_duration: Some(connection_duration),
                    request_latency: Some(-3.0),
                    success_rate: Some(f64::NAN),
                    ..Default::default()
                },
            );

            for score in [
                record.efficiency_score,
                record.connection_quality_score,
                record.bandwidth_utilization,
                record.success_rate,
            ] {
                assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            }
        }

        #[test]
        fn it_should_rate_a_peer_running_at_a_peak_beyond_the_float_range_as_fully_utilized() {
            let mut record = PeerRecord::new("p1", Duration::ZERO);

            apply(
                &mut record,
                PeerUpdate {
                    bytes_downloaded: Some(u64::MAX),
                    download_rate: Some(f64::MAX),
                    upload_rate: Some(f64::MAX),
                    connection_duration: Some(1e-300),
                    ..Default::default()
                },
            );

            assert_relative_eq!(record.bandwidth_utilization, 1.0);
            assert_relative_eq!(record.efficiency_score, 1.0);
        }
    }
}
