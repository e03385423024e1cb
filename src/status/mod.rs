//! Decoders for the three status wire formats.
//!
//! Every decoder produces a [`RawMetrics`] bag: short source-field names
//! mapped to untyped values. Typing happens later, when the bag is mapped
//! through a metric definition table.

pub mod flatten;
pub mod plus;
pub mod stub;

pub use flatten::{decode_object, flatten_object};
pub use plus::parse_plus_status;
pub use stub::parse_stub_status;

use std::collections::HashMap;
use std::fmt;
use std::io;

use serde::Serialize;

/// Raw key/value bag produced by one status poll.
pub type RawMetrics = HashMap<String, RawValue>;

/// An untyped value read from a status body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl RawValue {
    /// Numeric view of the value, if it has one.
    ///
    /// Strings holding a number are accepted; booleans are not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Int(v) => Some(*v as f64),
            RawValue::Float(v) => Some(*v),
            RawValue::Text(s) => s.trim().parse().ok(),
            RawValue::Bool(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RawValue::Text(_))
    }

    /// Converts a scalar JSON value. Arrays, objects and nulls have no raw form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => RawValue::Int(i),
                None => RawValue::Float(n.as_f64()?),
            }),
            serde_json::Value::String(s) => Some(RawValue::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(RawValue::Bool(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

/// Errors produced while decoding a status body.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// A stub-status line did not match its expected pattern (0-based index).
    #[error("Line {0} of status doesn't match")]
    LineMismatch(usize),

    #[error("error reading status body: {0}")]
    Io(#[from] io::Error),

    /// The decoder's own message is kept verbatim for diagnostics.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(RawValue::from_json(&json!(5)), Some(RawValue::Int(5)));
        assert_eq!(RawValue::from_json(&json!(1.5)), Some(RawValue::Float(1.5)));
        assert_eq!(RawValue::from_json(&json!("x")), Some(RawValue::Text("x".into())));
        assert_eq!(RawValue::from_json(&json!(true)), Some(RawValue::Bool(true)));
        assert_eq!(RawValue::from_json(&json!(null)), None);
        assert_eq!(RawValue::from_json(&json!([1])), None);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(RawValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(RawValue::Text(" 2.5 ".into()).as_f64(), Some(2.5));
        assert_eq!(RawValue::Text("1.21.3".into()).as_f64(), None);
        assert_eq!(RawValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_line_mismatch_message() {
        assert_eq!(
            StatusError::LineMismatch(2).to_string(),
            "Line 2 of status doesn't match"
        );
    }
}
