//! Typed metric set and the tables that map raw status fields onto it.
//!
//! Every decoder produces an untyped [`RawMetrics`](crate::status::RawMetrics)
//! bag. The mapper resolves a definition table against that bag and writes
//! typed [`Metric`]s into a [`MetricSet`]. The kind of a metric is fixed by its
//! definition, never by the shape of the value that happens to arrive.

pub mod definition;
pub mod mapper;

pub use definition::{
    API_RENAMES, MetricDefinition, MetricSource, PLUS_METRICS, STUB_METRICS, connections_dropped,
};
pub use mapper::{api_metric_type, path_to_prefix, populate_api_metrics, populate_metrics};

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::status::RawValue;

/// How the backend should treat a metric's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricKind {
    /// Point-in-time value.
    Gauge,
    /// Monotonic counter reported per second.
    Rate,
    /// Monotonic counter reported as a difference between samples.
    Delta,
    /// Free-form string.
    Attribute,
}

impl MetricKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, MetricKind::Attribute)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricKind::Gauge => "GAUGE",
            MetricKind::Rate => "RATE",
            MetricKind::Delta => "DELTA",
            MetricKind::Attribute => "ATTRIBUTE",
        };
        f.write_str(s)
    }
}

/// A typed metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    pub kind: MetricKind,
}

#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("metric {name}: value '{value}' is not numeric, required by {kind}")]
    NotNumeric {
        name: String,
        value: String,
        kind: MetricKind,
    },
}

/// Metrics gathered in one poll, plus the sample's identifying attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    event_type: String,
    attributes: BTreeMap<String, String>,
    metrics: BTreeMap<String, Metric>,
}

impl MetricSet {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            attributes: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Adds an identifying attribute (e.g. `port`).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Stores a metric, converting the raw value to the declared kind.
    ///
    /// Numeric kinds accept integers, floats and numeric strings. Attributes
    /// accept anything and keep its string form.
    pub fn set_metric(
        &mut self,
        name: &str,
        raw: &RawValue,
        kind: MetricKind,
    ) -> Result<(), MetricError> {
        let value = if kind.is_numeric() {
            match raw {
                RawValue::Int(v) => MetricValue::Int(*v),
                RawValue::Float(v) => MetricValue::Float(*v),
                other => match other.as_f64() {
                    Some(v) => MetricValue::Float(v),
                    None => {
                        return Err(MetricError::NotNumeric {
                            name: name.to_string(),
                            value: other.to_string(),
                            kind,
                        });
                    }
                },
            }
        } else {
            MetricValue::Text(raw.to_string())
        };

        self.metrics.insert(
            name.to_string(),
            Metric {
                name: name.to_string(),
                value,
                kind,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    /// Shorthand for the value of a metric.
    pub fn value(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name).map(|m| &m.value)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.values()
    }

    /// Kind of every metric, keyed by name.
    pub fn kinds(&self) -> BTreeMap<&str, MetricKind> {
        self.metrics
            .values()
            .map(|m| (m.name.as_str(), m.kind))
            .collect()
    }
}

// Published as one flat sample: event type, attributes, then metric values.
impl Serialize for MetricSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map =
            serializer.serialize_map(Some(1 + self.attributes.len() + self.metrics.len()))?;
        map.serialize_entry("event_type", &self.event_type)?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        for (name, metric) in &self.metrics {
            map.serialize_entry(name, &metric.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kind_rejects_text() {
        let mut set = MetricSet::new("NginxSample");
        let err = set
            .set_metric("net.connectionsActive", &RawValue::from("lots"), MetricKind::Gauge)
            .unwrap_err();
        assert!(err.to_string().contains("GAUGE"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let mut set = MetricSet::new("NginxSample");
        set.set_metric("a", &RawValue::from("12"), MetricKind::Rate)
            .unwrap();
        assert_eq!(set.value("a"), Some(&MetricValue::Float(12.0)));
    }

    #[test]
    fn test_attribute_keeps_string_form() {
        let mut set = MetricSet::new("NginxSample");
        set.set_metric("software.version", &RawValue::Int(2), MetricKind::Attribute)
            .unwrap();
        assert_eq!(set.value("software.version").and_then(|v| v.as_str()), Some("2"));
        assert_eq!(set.get("software.version").unwrap().kind, MetricKind::Attribute);
    }

    #[test]
    fn test_bool_rejected_for_delta() {
        let mut set = MetricSet::new("NginxSample");
        assert!(set
            .set_metric("ssl.handshakes", &RawValue::Bool(true), MetricKind::Delta)
            .is_err());
    }

    #[test]
    fn test_serialize_flat_sample() {
        let mut set = MetricSet::new("NginxSample").with_attribute("port", "80");
        set.set_metric("net.connectionsActive", &RawValue::Int(6), MetricKind::Gauge)
            .unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["event_type"], "NginxSample");
        assert_eq!(json["port"], "80");
        assert_eq!(json["net.connectionsActive"], 6);
        assert_eq!(set.kinds()["net.connectionsActive"], MetricKind::Gauge);
    }
}
