use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::prometheus::PrometheusSerializable;

/// The `# HELP` text of a metric.
#[derive(Debug, Display, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct MetricDescription(String);

impl MetricDescription {
    #[must_use]
    pub fn new(description: &str) -> Self {
        Self(description.to_owned())
    }
}

impl PrometheusSerializable for MetricDescription {
    /// Help text must stay on one line; backslashes and line feeds are escaped.
    fn to_prometheus(&self) -> String {
        self.0.replace('\\', "\\\\").replace('\n', "\\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_escape_line_feeds_and_backslashes() {
        let description = MetricDescription::new("first\nsecond \\ third");

        assert_eq!(description.to_prometheus(), "first\\nsecond \\\\ third");
    }
}
