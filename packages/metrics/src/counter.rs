use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::prometheus::PrometheusSerializable;

/// A monotonically increasing value.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter(u64);

impl Counter {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn increment(&mut self, value: u64) {
        self.0 = self.0.saturating_add(value);
    }
}

impl From<u64> for Counter {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Counter> for u64 {
    fn from(counter: Counter) -> Self {
        counter.value()
    }
}

impl PrometheusSerializable for Counter {
    fn to_prometheus(&self) -> String {
        self.value().to_string()
    }
}

/// Follows an externally maintained running total and yields the amounts
/// a counter mirroring it should advance by.
///
/// The source total may go down (for example when a torrent is dropped and
/// its bytes leave the global sum). The yielded deltas never are negative:
/// a lower total only becomes the new baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalTracker {
    baseline: u64,
}

impl TotalTracker {
    /// The last observed total.
    #[must_use]
    pub fn baseline(&self) -> u64 {
        self.baseline
    }

    /// Feeds the latest observed total and returns how much it grew since
    /// the previous one.
    pub fn observe(&mut self, total: u64) -> u64 {
        let delta = total.saturating_sub(self.baseline);

        self.baseline = total;

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod the_counter {
        use super::*;

        #[test]
        fn it_should_start_at_zero() {
            assert_eq!(Counter::default().value(), 0);
        }

        #[test]
        fn it_could_be_incremented() {
            let mut counter = Counter::new(0);

            counter.increment(1);
            counter.increment(2);

            assert_eq!(counter.value(), 3);
        }

        #[test]
        fn it_should_saturate_instead_of_overflowing() {
            let mut counter = Counter::new(u64::MAX - 1);

            counter.increment(10);

            assert_eq!(counter.value(), u64::MAX);
        }

        #[test]
        fn it_serializes_to_prometheus() {
            assert_eq!(Counter::new(42).to_prometheus(), "42");
        }
    }

    mod the_total_tracker {
        use super::*;

        #[test]
        fn it_should_yield_the_growth_of_an_increasing_total() {
            let mut tracker = TotalTracker::default();

            assert_eq!(tracker.observe(100), 100);
            assert_eq!(tracker.observe(150), 50);
            assert_eq!(tracker.baseline(), 150);
        }

        #[test]
        fn it_should_yield_nothing_when_the_total_decreases() {
            let mut tracker = TotalTracker::default();

            tracker.observe(1000);

            assert_eq!(tracker.observe(400), 0);
            assert_eq!(tracker.baseline(), 400);
        }

        #[test]
        fn it_should_rebase_on_the_lower_total_after_a_decrease() {
            let mut tracker = TotalTracker::default();

            let advanced: u64 = [1000, 400, 500].into_iter().map(|total| tracker.observe(total)).sum();

            assert_eq!(advanced, 1100);
        }
    }
}
