//! Background jobs of a started engine.
//!
//! Both periodic jobs follow the same shape: a `tokio::time::interval` whose
//! immediate first tick is consumed, and a `select!` biased toward the
//! cancellation token. They hold a weak reference to the engine and stop
//! when it has been dropped. A failed iteration is logged and the job keeps
//! its schedule.
pub mod manager;
pub mod reaper;
pub mod refresh;
