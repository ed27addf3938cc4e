//! A set of unlabeled counters and gauges addressed by name.
//!
//! Metrics must be described before they are written. Writing to an unknown
//! name, or to a name registered with the other kind, is an error.
use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::counter::{Counter, TotalTracker};
use crate::gauge::Gauge;
use crate::metric::description::MetricDescription;
use crate::metric::name::MetricName;
use crate::metric::{Metric, MetricKind};
use crate::prometheus::PrometheusSerializable;
use crate::unit::Unit;
use crate::METRICS_TARGET;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Metric '{metric_name}' has not been described")]
    UnknownMetric { metric_name: MetricName },

    #[error("Metric '{metric_name}' is a {actual}, not a {expected}")]
    MetricKindMismatch {
        metric_name: MetricName,
        expected: MetricKind,
        actual: MetricKind,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    counters: BTreeMap<MetricName, (Metric<Counter>, TotalTracker)>,
    gauges: BTreeMap<MetricName, Metric<Gauge>>,
}

impl MetricRegistry {
    /// Registers a counter. Describing an existing counter again keeps its
    /// value and replaces its metadata.
    pub fn describe_counter(&mut self, name: &MetricName, unit: Unit, description: &str) {
        let (value, tracker) = self
            .counters
            .get(name)
            .map(|(metric, tracker)| (*metric.value(), *tracker))
            .unwrap_or_default();

        let mut metric = Metric::new(name.clone(), unit, MetricDescription::new(description));
        *metric.value_mut() = value;

        self.gauges.remove(name);
        self.counters.insert(name.clone(), (metric, tracker));

        tracing::debug!(target: METRICS_TARGET, %name, "counter described");
    }

    /// Registers a gauge. Describing an existing gauge again keeps its value
    /// and replaces its metadata.
    pub fn describe_gauge(&mut self, name: &MetricName, unit: Unit, description: &str) {
        let value = self.gauges.get(name).map(|metric| *metric.value()).unwrap_or_default();

        let mut metric = Metric::new(name.clone(), unit, MetricDescription::new(description));
        *metric.value_mut() = value;

        self.counters.remove(name);
        self.gauges.insert(name.clone(), metric);

        tracing::debug!(target: METRICS_TARGET, %name, "gauge described");
    }

    /// # Errors
    ///
    /// Will return an error if the name is not a described gauge.
    pub fn set_gauge(&mut self, name: &MetricName, value: f64) -> Result<(), Error> {
        match self.gauges.get_mut(name) {
            Some(metric) => {
                metric.value_mut().set(value);
                Ok(())
            }
            None => Err(self.missing(name, MetricKind::Gauge)),
        }
    }

    /// # Errors
    ///
    /// Will return an error if the name is not a described counter.
    pub fn increment_counter(&mut self, name: &MetricName, value: u64) -> Result<(), Error> {
        match self.counters.get_mut(name) {
            Some((metric, _)) => {
                metric.value_mut().increment(value);
                Ok(())
            }
            None => Err(self.missing(name, MetricKind::Counter)),
        }
    }

    /// Mirrors a running total into the counter without ever decreasing it.
    /// Returns the amount the counter advanced.
    ///
    /// # Errors
    ///
    /// Will return an error if the name is not a described counter.
    pub fn observe_counter_total(&mut self, name: &MetricName, total: u64) -> Result<u64, Error> {
        match self.counters.get_mut(name) {
            Some((metric, tracker)) => {
                let advanced = tracker.observe(total);
                metric.value_mut().increment(advanced);
                Ok(advanced)
            }
            None => Err(self.missing(name, MetricKind::Counter)),
        }
    }

    #[must_use]
    pub fn get_counter_value(&self, name: &MetricName) -> Option<Counter> {
        self.counters.get(name).map(|(metric, _)| *metric.value())
    }

    #[must_use]
    pub fn get_gauge_value(&self, name: &MetricName) -> Option<Gauge> {
        self.gauges.get(name).map(|metric| *metric.value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len() + self.gauges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn missing(&self, name: &MetricName, expected: MetricKind) -> Error {
        let actual = match expected {
            MetricKind::Counter if self.gauges.contains_key(name) => Some(MetricKind::Gauge),
            MetricKind::Gauge if self.counters.contains_key(name) => Some(MetricKind::Counter),
            _ => None,
        };

        match actual {
            Some(actual) => Error::MetricKindMismatch {
                metric_name: name.clone(),
                expected,
                actual,
            },
            None => Error::UnknownMetric {
                metric_name: name.clone(),
            },
        }
    }
}

impl PrometheusSerializable for MetricRegistry {
    /// Metrics are separated by a blank line. Gauges come before counters and
    /// each kind is sorted by name.
    fn to_prometheus(&self) -> String {
        let gauges = self.gauges.values().map(|metric| metric.to_prometheus());
        let counters = self.counters.values().map(|(metric, _)| metric.to_prometheus());

        let mut text = gauges.chain(counters).collect::<Vec<_>>().join("\n\n");

        if !text.is_empty() {
            text.push('\n');
        }

        text
    }
}

#[derive(serde::Serialize)]
struct SerializedMetric<'a> {
    #[serde(rename = "type")]
    kind: MetricKind,
    name: &'a MetricName,
    unit: Unit,
    description: &'a MetricDescription,
    value: serde_json::Value,
}

/// Serializes the registry as a list of `{type, name, unit, description, value}` objects.
impl Serialize for MetricRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;

        for metric in self.gauges.values() {
            seq.serialize_element(&SerializedMetric {
                kind: MetricKind::Gauge,
                name: metric.name(),
                unit: metric.unit(),
                description: metric.description(),
                value: serde_json::Value::from(metric.value().value()),
            })?;
        }

        for (metric, _) in self.counters.values() {
            seq.serialize_element(&SerializedMetric {
                kind: MetricKind::Counter,
                name: metric.name(),
                unit: metric.unit(),
                description: metric.description(),
                value: serde_json::Value::from(metric.value().value()),
            })?;
        }

        seq.end()
    }
}
