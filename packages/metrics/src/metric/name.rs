use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::prometheus::PrometheusSerializable;

/// The name of a metric series.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub struct MetricName(String);

impl MetricName {
    /// # Panics
    ///
    /// Panics if the provided name is empty.
    #[must_use]
    pub fn new(name: &str) -> Self {
        assert!(!name.is_empty(), "Metric name cannot be empty.");
        Self(name.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PrometheusSerializable for MetricName {
    /// Replaces every character outside `[a-zA-Z_:][a-zA-Z0-9_:]*` with `_`.
    fn to_prometheus(&self) -> String {
        let allowed = |position: usize, c: char| c == '_' || c == ':' || c.is_ascii_alphabetic() || (position > 0 && c.is_ascii_digit());

        self.0
            .chars()
            .enumerate()
            .map(|(position, c)| if allowed(position, c) { c } else { '_' })
            .collect()
    }
}

#[macro_export]
macro_rules! metric_name {
    ("") => {
        compile_error!("Metric name cannot be empty");
    };
    ($name:literal) => {
        $crate::metric::name::MetricName::new($name)
    };
    ($name:ident) => {
        $crate::metric::name::MetricName::new($name)
    };
}
