//! Abstraction over HTTP access to the status surface.
//!
//! The `StatusFetcher` trait lets the collector talk to a real server or to
//! an in-memory mock in tests.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderName, SERVER};

/// A fetched status response, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Value of the `Server` header.
    pub server: Option<String>,
    pub body: Vec<u8>,
}

impl StatusResponse {
    /// A 200 response with the given content type and body.
    pub fn ok(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(str::to_string),
            server: None,
            body: body.into(),
        }
    }

    pub fn with_server(mut self, server: &str) -> Self {
        self.server = Some(server.to_string());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// True when the content type declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// Performs a single GET against a status URL.
pub trait StatusFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<StatusResponse, FetchError>;
}

/// Fetcher backed by a blocking `reqwest` client.
///
/// Every request is bounded by the configured timeout and never retried.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, validate_certs: bool) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!validate_certs)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl StatusFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<StatusResponse, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            reason: if e.is_timeout() {
                "timed out".to_string()
            } else {
                e.to_string()
            },
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let server = header(SERVER);
        let status = response.status().as_u16();
        let body = response.bytes().map_err(request_error)?.to_vec();

        Ok(StatusResponse {
            status,
            content_type,
            server,
            body,
        })
    }
}
