//! Logging for tests.
use std::sync::Once;

use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// Installs a compact subscriber writing to the test output capture.
///
/// Safe to call from every test: only the first call installs it.
pub fn setup() {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_max_level(LevelFilter::DEBUG)
            .with_test_writer()
            .with_ansi(false)
            .compact();

        if builder.try_init().is_err() {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}
