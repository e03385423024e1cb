//! Collector configuration.
//!
//! A [`CollectorConfig`] is built once by the binary and passed by reference
//! to every entry point; nothing in the library reads process-wide state.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_STATUS_URL: &str = "http://127.0.0.1/status";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/nginx/nginx.conf";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sub-paths polled for the multi-endpoint API.
pub const DEFAULT_API_ENDPOINTS: &[&str] =
    &["/nginx", "/processes", "/connections", "/http/requests", "/ssl"];

/// Which status module the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusModule {
    /// Probe the status URL and pick one of the others.
    #[default]
    Discover,
    /// Plain-text `ngx_http_stub_status_module`.
    StubStatus,
    /// Fixed-shape JSON `ngx_http_status_module`.
    Status,
    /// Multi-endpoint JSON `ngx_http_api_module`.
    Api,
}

impl StatusModule {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusModule::Discover => "discover",
            StatusModule::StubStatus => "ngx_http_stub_status_module",
            StatusModule::Status => "ngx_http_status_module",
            StatusModule::Api => "ngx_http_api_module",
        }
    }
}

impl fmt::Display for StatusModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "discover" | "auto-discover" => Ok(StatusModule::Discover),
            "ngx_http_stub_status_module" | "stub-text" => Ok(StatusModule::StubStatus),
            "ngx_http_status_module" | "fixed-json" => Ok(StatusModule::Status),
            "ngx_http_api_module" | "multi-endpoint-json" => Ok(StatusModule::Api),
            other => Err(format!(
                "unknown status module '{}' (expected discover, ngx_http_stub_status_module, \
                 ngx_http_status_module or ngx_http_api_module)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub status_url: String,
    pub config_path: PathBuf,
    pub timeout: Duration,
    pub status_module: StatusModule,
    /// Verify TLS certificates of the status endpoint.
    pub validate_certs: bool,
    /// Report as a remote `host:port` entity instead of the local host.
    pub remote_monitoring: bool,
    /// Sub-paths polled by the multi-endpoint module.
    pub api_endpoints: Vec<String>,
    /// Parse the configuration file.
    pub inventory: bool,
    /// Poll the status surface.
    pub metrics: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            timeout: DEFAULT_TIMEOUT,
            status_module: StatusModule::default(),
            validate_certs: true,
            remote_monitoring: false,
            api_endpoints: DEFAULT_API_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            inventory: true,
            metrics: true,
        }
    }
}

impl CollectorConfig {
    /// Full URL of a status sub-path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.status_url, path)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UrlError {
    #[error("invalid status URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
    #[error("unsupported protocol scheme")]
    UnsupportedScheme,
    #[error("http: no Host in request URL")]
    MissingHost,
}

/// Extracts host and port from the status URL.
///
/// Only http and https are accepted; the port defaults to 80 or 443.
pub fn parse_status_url(status_url: &str) -> Result<(String, String), UrlError> {
    let url = Url::parse(status_url).map_err(|e| UrlError::Invalid {
        url: status_url.to_string(),
        reason: e.to_string(),
    })?;

    let default_port = match url.scheme() {
        "http" => 80,
        "https" => 443,
        _ => return Err(UrlError::UnsupportedScheme),
    };

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.trim_start_matches('[').trim_end_matches(']').to_string(),
        _ => return Err(UrlError::MissingHost),
    };
    let port = url.port().unwrap_or(default_port);

    Ok((host, port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_module_from_str() {
        assert_eq!("discover".parse(), Ok(StatusModule::Discover));
        assert_eq!(
            "ngx_http_stub_status_module".parse(),
            Ok(StatusModule::StubStatus)
        );
        assert_eq!("fixed-json".parse(), Ok(StatusModule::Status));
        assert_eq!("ngx_http_api_module".parse(), Ok(StatusModule::Api));
        assert!("nope".parse::<StatusModule>().is_err());
    }

    #[test]
    fn test_parse_status_url() {
        assert_eq!(
            parse_status_url("http://127.0.0.1/status"),
            Ok(("127.0.0.1".to_string(), "80".to_string()))
        );
        assert_eq!(
            parse_status_url("https://nginx.local/api/6"),
            Ok(("nginx.local".to_string(), "443".to_string()))
        );
        assert_eq!(
            parse_status_url("http://localhost:8080/status"),
            Ok(("localhost".to_string(), "8080".to_string()))
        );
        assert_eq!(
            parse_status_url("ftp://localhost/status"),
            Err(UrlError::UnsupportedScheme)
        );
        assert!(matches!(
            parse_status_url("not a url"),
            Err(UrlError::Invalid { .. })
        ));
    }

    #[test]
    fn test_endpoint_url() {
        let config = CollectorConfig {
            status_url: "http://localhost/api/6".to_string(),
            ..CollectorConfig::default()
        };
        assert_eq!(
            config.endpoint_url("/http/requests"),
            "http://localhost/api/6/http/requests"
        );
        assert_eq!(config.api_endpoints.len(), 5);
    }
}
