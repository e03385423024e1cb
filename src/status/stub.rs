//! Parser for the plain-text stub status report.
//!
//! ```text
//! Active connections: 291
//! server accepts handled requests
//!  16630948 16630948 31070465
//! Reading: 6 Writing: 179 Waiting: 106
//! ```

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::{RawMetrics, RawValue, StatusError};

/// Edition reported for the open-source status module.
pub const OPEN_SOURCE_EDITION: &str = "open source";

/// One pattern per report line, in order. `None` marks the header line.
static LINE_PATTERNS: LazyLock<[Option<Regex>; 4]> = LazyLock::new(|| {
    [
        Some(compile(r"^Active connections:\s+(?P<active>\d+)")),
        None,
        Some(compile(
            r"^\s*(?P<accepted>\d+)\s+(?P<handled>\d+)\s+(?P<requests>\d+)",
        )),
        Some(compile(
            r"^Reading: (?P<reading>\d+)\s+Writing: (?P<writing>\d+)\s+Waiting: (?P<waiting>\d+)",
        )),
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static stub status pattern")
}

/// Parses a stub status body into a raw bag.
///
/// Fields: `active`, `accepted`, `handled`, `requests`, `reading`,
/// `writing`, `waiting`, plus `version` (empty, filled in by the caller from
/// the `Server` header) and `edition`.
///
/// A body that ends before all four lines is not an error: older servers and
/// truncated responses yield whatever fields were read.
pub fn parse_stub_status<R: BufRead>(mut reader: R) -> Result<RawMetrics, StatusError> {
    let mut metrics = RawMetrics::new();
    let mut line = String::new();

    for (line_no, pattern) in LINE_PATTERNS.iter().enumerate() {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let Some(re) = pattern else {
            continue;
        };

        let caps = re
            .captures(&line)
            .ok_or(StatusError::LineMismatch(line_no))?;

        for name in re.capture_names().flatten() {
            let Some(m) = caps.name(name) else {
                continue;
            };
            match m.as_str().parse::<i64>() {
                Ok(value) => {
                    metrics.insert(name.to_string(), RawValue::Int(value));
                }
                Err(_) => warn!("can't cast value '{}' for {}", m.as_str(), name),
            }
        }
    }

    metrics.insert("version".to_string(), RawValue::Text(String::new()));
    metrics.insert(
        "edition".to_string(),
        RawValue::Text(OPEN_SOURCE_EDITION.to_string()),
    );

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const STUB_STATUS: &str = "Active connections: 291
server accepts handled requests
 16630948 16630948 31070465
Reading: 6 Writing: 179 Waiting: 106
";

    const BAD_STUB_STATUS: &str = "Active connections: 291
server accepts handled requests
this is an extra line that makes the parser fail
 16630948 16630948 31070465
Reading: 6 Writing: 179 Waiting: 106
";

    #[test]
    fn test_parse_stub_status() {
        let raw = parse_stub_status(Cursor::new(STUB_STATUS)).unwrap();
        assert_eq!(raw.len(), 9);
        assert_eq!(raw["active"], RawValue::Int(291));
        assert_eq!(raw["accepted"], RawValue::Int(16630948));
        assert_eq!(raw["handled"], RawValue::Int(16630948));
        assert_eq!(raw["requests"], RawValue::Int(31070465));
        assert_eq!(raw["reading"], RawValue::Int(6));
        assert_eq!(raw["writing"], RawValue::Int(179));
        assert_eq!(raw["waiting"], RawValue::Int(106));
        assert_eq!(raw["edition"], RawValue::Text("open source".into()));
        assert_eq!(raw["version"], RawValue::Text(String::new()));
    }

    #[test]
    fn test_inserted_line_fails_at_its_index() {
        let err = parse_stub_status(Cursor::new(BAD_STUB_STATUS)).unwrap_err();
        assert!(matches!(err, StatusError::LineMismatch(2)));
        assert_eq!(err.to_string(), "Line 2 of status doesn't match");
    }

    #[test]
    fn test_first_line_mismatch() {
        let err = parse_stub_status(Cursor::new("<html>\n")).unwrap_err();
        assert!(matches!(err, StatusError::LineMismatch(0)));
    }

    #[test]
    fn test_short_body_returns_partial_fields() {
        let raw = parse_stub_status(Cursor::new("Active connections: 7\n")).unwrap();
        assert_eq!(raw["active"], RawValue::Int(7));
        assert!(!raw.contains_key("accepted"));
        assert!(raw.contains_key("edition"));
    }

    #[test]
    fn test_empty_body() {
        let raw = parse_stub_status(Cursor::new("")).unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_last_line_without_newline() {
        let body = STUB_STATUS.trim_end();
        let raw = parse_stub_status(Cursor::new(body)).unwrap();
        assert_eq!(raw["waiting"], RawValue::Int(106));
    }

    #[test]
    fn test_overflowing_capture_is_dropped() {
        let body = "Active connections: 99999999999999999999999\n";
        let raw = parse_stub_status(Cursor::new(body)).unwrap();
        assert!(!raw.contains_key("active"));
    }
}
