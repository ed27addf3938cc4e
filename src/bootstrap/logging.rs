//! Setup for the application logging.
//!
//! It redirects the log info to the standard output with the log threshold
//! defined in the configuration:
//!
//! - `Off`: nothing is logged and no subscriber is installed.
//! - `Error`, `Warn`, `Info`, `Debug`, `Trace`: the matching level filter.
use std::sync::Once;

use ccbt_configuration::{Configuration, Threshold};
use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// It redirects the log info to the standard output with the log threshold
/// defined in the configuration.
pub fn setup(cfg: &Configuration) {
    let tracing_level = map_to_tracing_level_filter(cfg.logging.threshold);

    if tracing_level == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        tracing_stdout_init(tracing_level);
    });
}

fn map_to_tracing_level_filter(threshold: Threshold) -> LevelFilter {
    match threshold {
        Threshold::Off => LevelFilter::OFF,
        Threshold::Error => LevelFilter::ERROR,
        Threshold::Warn => LevelFilter::WARN,
        Threshold::Info => LevelFilter::INFO,
        Threshold::Debug => LevelFilter::DEBUG,
        Threshold::Trace => LevelFilter::TRACE,
    }
}

fn tracing_stdout_init(filter: LevelFilter) {
    let builder = tracing_subscriber::fmt().with_max_level(filter);

    if builder.try_init().is_err() {
        eprintln!("A global tracing subscriber was already installed");
        return;
    }

    tracing::info!("Logging initialized");
}

#[cfg(test)]
mod tests {
    use ccbt_configuration::Threshold;
    use rstest::rstest;
    use tracing::level_filters::LevelFilter;

    use super::map_to_tracing_level_filter;

    #[rstest]
    #[case(Threshold::Off, LevelFilter::OFF)]
    #[case(Threshold::Error, LevelFilter::ERROR)]
    #[case(Threshold::Warn, LevelFilter::WARN)]
    #[case(Threshold::Info, LevelFilter::INFO)]
    #[case(Threshold::Debug, LevelFilter::DEBUG)]
    #[case(Threshold::Trace, LevelFilter::TRACE)]
    fn it_should_map_each_threshold_to_a_level_filter(#[case] threshold: Threshold, #[case] expected: LevelFilter) {
        assert_eq!(map_to_tracing_level_filter(threshold), expected);
    }
}
