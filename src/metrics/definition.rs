//! Metric definition tables, one per status format.

use crate::status::{RawMetrics, RawValue};

use super::MetricKind;

/// Where a metric's value comes from.
#[derive(Clone, Copy)]
pub enum MetricSource {
    /// A field looked up directly in the raw bag.
    FromKey(&'static str),
    /// A value computed from several raw fields; `None` when inputs are missing.
    FromDerivation(fn(&RawMetrics) -> Option<RawValue>),
}

impl MetricSource {
    pub fn resolve(&self, raw: &RawMetrics) -> Option<RawValue> {
        match self {
            MetricSource::FromKey(key) => raw.get(*key).cloned(),
            MetricSource::FromDerivation(derive) => derive(raw),
        }
    }
}

impl std::fmt::Debug for MetricSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricSource::FromKey(key) => f.debug_tuple("FromKey").field(key).finish(),
            MetricSource::FromDerivation(_) => f.write_str("FromDerivation(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub source: MetricSource,
    pub kind: MetricKind,
}

const fn key(name: &'static str, source: &'static str, kind: MetricKind) -> MetricDefinition {
    MetricDefinition {
        name,
        source: MetricSource::FromKey(source),
        kind,
    }
}

const fn derived(
    name: &'static str,
    derive: fn(&RawMetrics) -> Option<RawValue>,
    kind: MetricKind,
) -> MetricDefinition {
    MetricDefinition {
        name,
        source: MetricSource::FromDerivation(derive),
        kind,
    }
}

/// Connections accepted but not handled.
pub fn connections_dropped(raw: &RawMetrics) -> Option<RawValue> {
    let accepted = raw.get("accepted")?.as_i64()?;
    let handled = raw.get("handled")?.as_i64()?;
    Some(RawValue::Int(accepted - handled))
}

/// Stub status text.
pub static STUB_METRICS: &[MetricDefinition] = &[
    key("software.edition", "edition", MetricKind::Attribute),
    key("software.version", "version", MetricKind::Attribute),
    key("net.connectionsActive", "active", MetricKind::Gauge),
    key("net.connectionsAcceptedPerSecond", "accepted", MetricKind::Rate),
    derived(
        "net.connectionsDroppedPerSecond",
        connections_dropped,
        MetricKind::Rate,
    ),
    key("net.connectionsReading", "reading", MetricKind::Gauge),
    key("net.connectionsWaiting", "waiting", MetricKind::Gauge),
    key("net.connectionsWriting", "writing", MetricKind::Gauge),
    key("net.requestsPerSecond", "requests", MetricKind::Rate),
];

/// Fixed-shape JSON status.
pub static PLUS_METRICS: &[MetricDefinition] = &[
    key("software.edition", "edition", MetricKind::Attribute),
    key("software.version", "version", MetricKind::Attribute),
    key("net.connectionsActive", "connections.active", MetricKind::Gauge),
    key("net.connectionsIdle", "connections.idle", MetricKind::Gauge),
    key(
        "net.connectionsAcceptedPerSecond",
        "connections.accepted",
        MetricKind::Rate,
    ),
    key(
        "net.connectionsDroppedPerSecond",
        "connections.dropped",
        MetricKind::Rate,
    ),
    key("net.requestsPerSecond", "requests.total", MetricKind::Rate),
    key("processes.respawned", "processes.respawned", MetricKind::Delta),
    key("ssl.handshakes", "ssl.handshakes", MetricKind::Delta),
    key("ssl.failedHandshakes", "ssl.handshakes_failed", MetricKind::Delta),
    key("ssl.sessionReuses", "ssl.session_reuses", MetricKind::Delta),
];

/// Renames for the multi-endpoint API: `(prefixed key, output name, kind)`.
pub static API_RENAMES: &[(&str, &str, MetricKind)] = &[
    ("nginx.version", "software.version", MetricKind::Attribute),
    ("connections.active", "net.connectionsActive", MetricKind::Gauge),
    ("connections.idle", "net.connectionsIdle", MetricKind::Gauge),
    (
        "connections.accepted",
        "net.connectionsAcceptedPerSecond",
        MetricKind::Rate,
    ),
    (
        "connections.dropped",
        "net.connectionsDroppedPerSecond",
        MetricKind::Rate,
    ),
    ("processes.respawned", "processes.respawned", MetricKind::Delta),
    ("ssl.handshakes", "ssl.handshakes", MetricKind::Delta),
    ("ssl.handshakes_failed", "ssl.failedHandshakes", MetricKind::Delta),
    ("ssl.session_reuses", "ssl.sessionReuses", MetricKind::Delta),
    ("http.requests.total", "net.requestsPerSecond", MetricKind::Rate),
    ("http.requests.current", "net.requests", MetricKind::Gauge),
];
