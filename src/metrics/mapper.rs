//! Mapping of raw status bags onto typed metric sets.

use tracing::warn;

use crate::status::{RawMetrics, RawValue};

use super::definition::{API_RENAMES, MetricDefinition};
use super::{MetricKind, MetricSet};

/// Edition set for every multi-endpoint sample.
const API_EDITION: &str = "plus";

/// Resolves every definition of `table` against `raw` and stores the results.
///
/// Missing sources and values that don't fit the declared kind are logged
/// and skipped; the rest of the table is still processed. Returns the number
/// of metrics stored.
pub fn populate_metrics(
    set: &mut MetricSet,
    raw: &RawMetrics,
    table: &[MetricDefinition],
) -> usize {
    let mut stored = 0;
    for def in table {
        let Some(value) = def.source.resolve(raw) else {
            warn!("can't find raw metrics in results for {}", def.name);
            continue;
        };
        match set.set_metric(def.name, &value, def.kind) {
            Ok(()) => stored += 1,
            Err(e) => warn!("error setting value: {}", e),
        }
    }
    stored
}

/// Converts an endpoint path into a key prefix.
///
/// `/http/requests` becomes `http.requests.`; paths made only of slashes
/// become the empty prefix.
pub fn path_to_prefix(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut prefix = trimmed.replace('/', ".");
    if !prefix.ends_with('.') {
        prefix.push('.');
    }
    if prefix.chars().all(|c| c == '.') {
        prefix.clear();
    }
    prefix
}

/// Output name and kind for a prefixed API key.
///
/// Known keys are renamed through [`API_RENAMES`]; anything else keeps its
/// key and gets a kind inferred from the value.
pub fn api_metric_type<'a>(key: &'a str, value: &RawValue) -> (&'a str, MetricKind) {
    if let Some((_, name, kind)) = API_RENAMES.iter().find(|(k, _, _)| *k == key) {
        return (*name, *kind);
    }
    if value.is_text() {
        (key, MetricKind::Attribute)
    } else {
        (key, MetricKind::Gauge)
    }
}

/// Stores the flattened body of one API endpoint.
///
/// An empty body is "no metrics from this endpoint" and leaves the set
/// untouched. Returns the number of metrics stored.
pub fn populate_api_metrics(set: &mut MetricSet, path: &str, flat: &RawMetrics) -> usize {
    if flat.is_empty() {
        return 0;
    }

    let prefix = path_to_prefix(path);
    let mut stored = 0;
    for (k, v) in flat {
        let key = format!("{}{}", prefix, k);
        let (name, kind) = api_metric_type(&key, v);
        match set.set_metric(name, v, kind) {
            Ok(()) => stored += 1,
            Err(e) => warn!("unable to set metric: {}", e),
        }
    }

    if let Err(e) = set.set_metric(
        "software.edition",
        &RawValue::from(API_EDITION),
        MetricKind::Attribute,
    ) {
        warn!("unable to set metric: {}", e);
    }
    stored
}
