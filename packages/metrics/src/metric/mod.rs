pub mod description;
pub mod name;

use serde::{Deserialize, Serialize};

use self::description::MetricDescription;
use self::name::MetricName;
use crate::counter::Counter;
use crate::gauge::Gauge;
use crate::prometheus::PrometheusSerializable;
use crate::unit::Unit;

/// The Prometheus type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[display("counter")]
    Counter,
    #[display("gauge")]
    Gauge,
}

/// A single unlabeled series: its metadata plus the current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric<T> {
    name: MetricName,
    unit: Unit,
    description: MetricDescription,
    value: T,
}

impl<T: Default> Metric<T> {
    #[must_use]
    pub fn new(name: MetricName, unit: Unit, description: MetricDescription) -> Self {
        Self {
            name,
            unit,
            description,
            value: T::default(),
        }
    }
}

impl<T> Metric<T> {
    #[must_use]
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn description(&self) -> &MetricDescription {
        &self.description
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: PrometheusSerializable> Metric<T> {
    fn render(&self, kind: MetricKind) -> String {
        let name = self.name.to_prometheus();

        format!(
            "# HELP {name} {}\n# TYPE {name} {kind}\n{name} {}",
            self.description.to_prometheus(),
            self.value.to_prometheus()
        )
    }
}

impl PrometheusSerializable for Metric<Counter> {
    fn to_prometheus(&self) -> String {
        self.render(MetricKind::Counter)
    }
}

impl PrometheusSerializable for Metric<Gauge> {
    fn to_prometheus(&self) -> String {
        self.render(MetricKind::Gauge)
    }
}
