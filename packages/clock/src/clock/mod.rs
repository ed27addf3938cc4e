//! Clock implementations.
//!
//! - `Working`: reads the system time.
//! - `Stopped`: returns a per-thread fixed time that tests can move.
use std::marker::PhantomData;
use std::time::Duration;

use crate::DurationSinceUnixEpoch;

pub mod stopped;
pub mod working;

/// A generic structure that represents a clock.
///
/// It can be either the working clock (production) or the stopped clock
/// (testing). It implements the `Time` trait, which gives you the current time.
#[derive(Debug)]
pub struct Clock<T> {
    clock: PhantomData<T>,
}

/// The working clock. It returns the current time.
pub type Working = Clock<working::WorkingClock>;

/// The stopped clock. It returns always the same fixed time.
pub type Stopped = Clock<stopped::StoppedClock>;

/// Trait for types that can be used as a timestamp clock.
pub trait Time: Sized {
    fn now() -> DurationSinceUnixEpoch;

    #[must_use]
    fn now_add(add_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_add(*add_time)
    }

    #[must_use]
    fn now_sub(sub_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_sub(*sub_time)
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::time::Duration;

    use crate::clock::stopped::Stopped as _;
    use crate::clock::{Stopped, Time, Working};
    use crate::CurrentClock;

    #[test]
    fn it_should_be_the_stopped_clock_as_default_when_testing() {
        assert_eq!(TypeId::of::<Stopped>(), TypeId::of::<CurrentClock>());
        assert_ne!(TypeId::of::<Working>(), TypeId::of::<CurrentClock>());
    }

    #[test]
    fn it_should_add_and_subtract_durations_from_now() {
        Stopped::local_set(&Duration::from_secs(100));

        assert_eq!(Stopped::now_add(&Duration::from_secs(10)), Some(Duration::from_secs(110)));
        assert_eq!(Stopped::now_sub(&Duration::from_secs(10)), Some(Duration::from_secs(90)));
        assert_eq!(Stopped::now_sub(&Duration::from_secs(101)), None);

        Stopped::local_reset();
    }
}
