//! Score calculators.
//!
//! Pure functions over the current state of a record. Every ratio they
//! produce is within `[0, 1]`, and every division is guarded so zero or
//! missing inputs leave a score at zero instead of producing `NaN`.
pub mod peer;
pub mod swarm;

/// Arithmetic mean, or `None` for an empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;

    Some(values.iter().sum::<f64>() / len)
}

/// Sample standard deviation (`n - 1` denominator), or `None` with fewer
/// than two values.
#[must_use]
pub fn sample_standard_deviation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = mean(values)?;

    #[allow(clippy::cast_precision_loss)]
    let denominator = (values.len() - 1) as f64;

    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / denominator;

    Some(variance.sqrt())
}
