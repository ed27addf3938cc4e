//! Time related functions and types.
//!
//! The metrics engine never reads the system time directly. It goes through
//! a clock type so tests can freeze and move time, which matters for
//! `last_activity` stamps, completion forecasts and the stale peer reaper.
//!
//! Clocks use the type `DurationSinceUnixEpoch` which is a
//! `std::time::Duration` since the Unix Epoch (timestamp).
//!
//! ```text
//! Timestamp:      1679929914
//! Duration:       1679929914.10167426
//! ```
//!
//! > **NOTICE**: the timestamp does not depend on the time zone.
pub mod clock;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = std::time::Duration;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
