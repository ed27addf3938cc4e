//! Telemetry records kept by the engine, and the partial updates producers
//! send to mutate them.
//!
//! Updates only carry the fields the producer knows about. A field left as
//! `None` keeps its previous value in the record.
pub mod peer;
pub mod repository;
pub mod torrent;

/// Rates, latencies and durations that are negative, `NaN` or infinite are
/// stored as zero.
#[must_use]
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clamps a ratio into `[0, 1]`. `NaN` becomes zero.
#[must_use]
pub fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{non_negative, unit_interval};

    #[rstest]
    #[case(2.5, 2.5)]
    #[case(0.0, 0.0)]
    #[case(-1.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(f64::INFINITY, 0.0)]
    fn it_should_store_invalid_magnitudes_as_zero(#[case] input: f64, #[case] expected: f64) {
        assert!((non_negative(input) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(0.5, 0.5)]
    #[case(-0.5, 0.0)]
    #[case(1.5, 1.0)]
    #[case(f64::NAN, 0.0)]
    fn it_should_clamp_ratios(#[case] input: f64, #[case] expected: f64) {
        assert!((unit_interval(input) - expected).abs() < f64::EPSILON);
    }
}
