//! JSON decoding and flattening.

use std::io::Read;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RawMetrics, RawValue, StatusError};

/// Decodes exactly one JSON object from the reader.
///
/// Only the first value is consumed; anything after it is left unread.
pub fn decode_object<R: Read>(reader: R) -> Result<Map<String, Value>, StatusError> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    Ok(Map::deserialize(&mut de)?)
}

/// Flattens a nested object into dot-joined keys.
///
/// Arrays flatten by index (`peers.0.id`). Nulls and empty containers
/// produce no entries.
pub fn flatten_object(object: &Map<String, Value>) -> RawMetrics {
    let mut out = RawMetrics::new();
    for (key, value) in object {
        flatten_into(key.clone(), value, &mut out);
    }
    out
}

fn flatten_into(key: String, value: &Value, out: &mut RawMetrics) {
    match value {
        Value::Object(map) => {
            for (child, v) in map {
                flatten_into(format!("{}.{}", key, child), v, out);
            }
        }
        Value::Array(items) => {
            for (idx, v) in items.iter().enumerate() {
                flatten_into(format!("{}.{}", key, idx), v, out);
            }
        }
        scalar => {
            if let Some(raw) = RawValue::from_json(scalar) {
                out.insert(key, raw);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_object() {
        let obj = decode_object(Cursor::new(r#"{"a": 1, "b": {"c": "x"}}"#)).unwrap();
        assert_eq!(obj.len(), 2);
    }

    #[test]
    fn test_decode_ignores_trailing_data() {
        let obj = decode_object(Cursor::new("{\"a\": 1}\n{\"b\": 2}")).unwrap();
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode_object(Cursor::new("{")).unwrap_err();
        assert!(matches!(err, StatusError::Decode(_)));
        assert!(err.to_string().contains("EOF"));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_object(Cursor::new(r#"["nginx","processes"]"#)).unwrap_err();
        assert!(matches!(err, StatusError::Decode(_)));
    }

    #[test]
    fn test_flatten_nested() {
        let obj = decode_object(Cursor::new(
            r#"{
                "load_timestamp": "2024-01-01T00:00:00Z",
                "upstreams": {"backend": {"peers": [
                    {"id": 0, "active": 2},
                    {"id": 1, "up": true}
                ]}},
                "empty": {},
                "nothing": null,
                "ratio": 0.5
            }"#,
        ))
        .unwrap();
        let flat = flatten_object(&obj);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat["upstreams.backend.peers.0.active"], RawValue::Int(2));
        assert_eq!(flat["upstreams.backend.peers.1.up"], RawValue::Bool(true));
        assert_eq!(flat["ratio"], RawValue::Float(0.5));
        assert!(flat["load_timestamp"].is_text());
        assert!(!flat.contains_key("empty"));
        assert!(!flat.contains_key("nothing"));
    }
}
