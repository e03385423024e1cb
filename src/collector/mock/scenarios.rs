//! Pre-built mock status servers for testing.
//!
//! Each scenario serves realistic bodies for one status module under a
//! given base URL.

use super::fetcher::MockFetcher;
use crate::collector::traits::StatusResponse;

/// `ngx_http_stub_status_module` output.
pub const STUB_STATUS: &str = "\
Active connections: 291
server accepts handled requests
 16630948 16630948 31070465
Reading: 6 Writing: 179 Waiting: 106
";

/// `ngx_http_status_module` output.
pub const PLUS_STATUS: &str = r#"{
  "version": 8,
  "nginx_version": "1.0",
  "timestamp": 1490347905131,
  "processes": {"respawned": 0},
  "connections": {
    "accepted": 4112716,
    "dropped": 0,
    "active": 6,
    "idle": 41
  },
  "ssl": {"handshakes": 79572, "handshakes_failed": 21025, "session_reuses": 15762},
  "requests": {
    "total": 9353067,
    "current": 5
  }
}
"#;

/// `ngx_http_api_module` root listing.
pub const API_ROOT: &str =
    r#"["nginx","processes","connections","slabs","http","stream","resolvers","ssl"]"#;

pub const API_NGINX: &str = r#"{
  "version": "1.21.3",
  "build": "nginx-plus-r25",
  "address": "206.251.255.64",
  "generation": 6,
  "load_timestamp": "2021-11-01T10:11:08.281Z",
  "timestamp": "2021-11-03T11:30:58.548Z",
  "pid": 3234,
  "ppid": 3231
}"#;

pub const API_CONNECTIONS: &str =
    r#"{"accepted": 4968119, "dropped": 0, "active": 5, "idle": 117}"#;

pub const API_HTTP_REQUESTS: &str = r#"{"total": 10624511, "current": 4}"#;

pub const API_SSL: &str = r#"{
  "handshakes": 79572,
  "handshakes_failed": 21025,
  "session_reuses": 15762,
  "no_common_protocol": 4,
  "bad_certificate": 0
}"#;

impl MockFetcher {
    /// Open-source server exposing stub status at `url`.
    pub fn stub_server(url: &str) -> Self {
        let mut fetcher = Self::new();
        fetcher.add_response(
            url,
            StatusResponse::ok(Some("text/plain"), STUB_STATUS).with_server("nginx/1.19.10"),
        );
        fetcher
    }

    /// Server exposing the fixed-shape JSON status at `url`.
    pub fn plus_server(url: &str) -> Self {
        let mut fetcher = Self::new();
        fetcher.add_json(url, PLUS_STATUS);
        fetcher
    }

    /// Server exposing the multi-endpoint API under `base`.
    ///
    /// `/processes` is not served, so polling it fails.
    pub fn api_server(base: &str) -> Self {
        let mut fetcher = Self::new();
        fetcher.add_json(base, API_ROOT);
        fetcher.add_json(format!("{}/nginx", base), API_NGINX);
        fetcher.add_json(format!("{}/connections", base), API_CONNECTIONS);
        fetcher.add_json(format!("{}/http/requests", base), API_HTTP_REQUESTS);
        fetcher.add_json(format!("{}/ssl", base), API_SSL);
        fetcher
    }
}
