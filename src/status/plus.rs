//! Decoder for the fixed-shape JSON status module.

use std::io::Read;

use serde_json::Value;
use tracing::warn;

use super::flatten::decode_object;
use super::{RawMetrics, RawValue, StatusError};

/// Edition reported for the JSON status modules.
pub const PLUS_EDITION: &str = "plus";

/// Top-level objects whose immediate children are collected.
const ROOTS: &[&str] = &["connections", "requests", "ssl", "processes"];

/// Parses a fixed-shape JSON status body.
///
/// Children of the known root objects are renamed `root.child` and coerced to
/// integers. `version` comes from the top-level `nginx_version` field.
pub fn parse_plus_status<R: Read>(reader: R) -> Result<RawMetrics, StatusError> {
    let object = decode_object(reader)?;
    let mut metrics = RawMetrics::new();

    for root in ROOTS {
        let Some(Value::Object(node)) = object.get(*root) else {
            warn!("status root '{}' missing or not an object", root);
            continue;
        };
        for (key, value) in node {
            match value.as_f64() {
                Some(v) => {
                    metrics.insert(format!("{}.{}", root, key), RawValue::Int(v as i64));
                }
                None => warn!("non-numeric value for {}.{}: {}", root, key, value),
            }
        }
    }

    if let Some(version) = object.get("nginx_version").and_then(RawValue::from_json) {
        metrics.insert("version".to_string(), version);
    }
    metrics.insert("edition".to_string(), RawValue::Text(PLUS_EDITION.to_string()));

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PLUS_STATUS: &str = r#"{
  "timestamp": 1490347905131,
  "connections": {
    "accepted": 4112716,
    "dropped": 0,
    "active": 6,
    "idle": 41
  },
  "requests": {
    "total": 9353067,
    "current": 5
  },
  "nginx_version": "1.0"
}
"#;

    #[test]
    fn test_parse_plus_status() {
        let raw = parse_plus_status(Cursor::new(PLUS_STATUS)).unwrap();
        assert_eq!(raw.len(), 8);
        assert_eq!(raw["connections.accepted"], RawValue::Int(4112716));
        assert_eq!(raw["connections.dropped"], RawValue::Int(0));
        assert_eq!(raw["connections.active"], RawValue::Int(6));
        assert_eq!(raw["connections.idle"], RawValue::Int(41));
        assert_eq!(raw["requests.total"], RawValue::Int(9353067));
        assert_eq!(raw["requests.current"], RawValue::Int(5));
        assert_eq!(raw["version"], RawValue::Text("1.0".into()));
        assert_eq!(raw["edition"], RawValue::Text("plus".into()));
    }

    #[test]
    fn test_parse_plus_status_malformed() {
        let err = parse_plus_status(Cursor::new("{")).unwrap_err();
        assert!(matches!(err, StatusError::Decode(_)));
    }

    #[test]
    fn test_float_values_truncate() {
        let raw = parse_plus_status(Cursor::new(r#"{"ssl": {"handshakes": 12.0}}"#)).unwrap();
        assert_eq!(raw["ssl.handshakes"], RawValue::Int(12));
    }

    #[test]
    fn test_non_object_root_is_skipped() {
        let raw = parse_plus_status(Cursor::new(
            r#"{"connections": 5, "processes": {"respawned": 1, "name": "x"}}"#,
        ))
        .unwrap();
        assert!(!raw.contains_key("connections"));
        assert_eq!(raw["processes.respawned"], RawValue::Int(1));
        assert!(!raw.contains_key("processes.name"));
        assert!(!raw.contains_key("version"));
    }
}
