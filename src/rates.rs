//! Global throughput smoothing.
//!
//! The engine keeps the last [`SAMPLE_BUFFER_CAPACITY`] global rate samples.
//! On every refresh the mean of that history is blended with the mean of the
//! live per-torrent rates:
//!
//! ```text
//! global = history_mean * 0.3 + torrent_mean * 0.7
//! ```
//!
//! Without torrents the history mean is used as is.
use std::collections::VecDeque;

use ccbt_clock::DurationSinceUnixEpoch;
use serde::{Deserialize, Serialize};

pub const SAMPLE_BUFFER_CAPACITY: usize = 60;

pub const HISTORY_WEIGHT: f64 = 0.3;
pub const LIVE_WEIGHT: f64 = 0.7;

/// Download and upload rates in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub download_rate: f64,
    pub upload_rate: f64,
}

impl Rates {
    #[must_use]
    pub fn new(download_rate: f64, upload_rate: f64) -> Self {
        Self {
            download_rate,
            upload_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    pub timestamp: DurationSinceUnixEpoch,
    pub download_rate: f64,
    pub upload_rate: f64,
}

/// Fixed capacity FIFO of rate samples. Pushing into a full buffer drops the
/// oldest sample.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<RateSample>,
    capacity: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::with_capacity(SAMPLE_BUFFER_CAPACITY)
    }
}

impl SampleBuffer {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Sample buffer capacity must be greater than zero.");

        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: RateSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RateSample> {
        self.samples.iter()
    }

    /// Unweighted mean of the buffered rates.
    #[must_use]
    pub fn mean(&self) -> Option<Rates> {
        if self.samples.is_empty() {
            return None;
        }

        let sum = self.samples.iter().fold(Rates::default(), |sum, sample| {
            Rates::new(sum.download_rate + sample.download_rate, sum.upload_rate + sample.upload_rate)
        });

        #[allow(clippy::cast_precision_loss)]
        let len = self.samples.len() as f64;

        Some(Rates::new(sum.download_rate / len, sum.upload_rate / len))
    }
}

/// Mixes the smoothed history with the live torrent average.
#[must_use]
pub fn blend(history: Rates, live: Option<Rates>) -> Rates {
    match live {
        Some(live) => Rates::new(
            history.download_rate * HISTORY_WEIGHT + live.download_rate * LIVE_WEIGHT,
            history.upload_rate * HISTORY_WEIGHT + live.upload_rate * LIVE_WEIGHT,
        ),
        None => history,
    }
}

/// Computes the global rates for the next refresh tick and records them.
///
/// With fewer than two samples there is no history to smooth yet: the
/// previous rates are held, and recorded so the history can build up.
pub fn next_global_rates(buffer: &mut SampleBuffer, previous: Rates, live: Option<Rates>, now: DurationSinceUnixEpoch) -> Rates {
    let rates = match buffer.mean() {
        Some(history) if buffer.len() >= 2 => blend(history, live),
        _ => previous,
    };

    buffer.push(RateSample {
        timestamp: now,
        download_rate: rates.download_rate,
        upload_rate: rates.upload_rate,
    });

    rates
}
