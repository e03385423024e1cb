//! In-memory status fetcher for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::collector::traits::{FetchError, StatusFetcher, StatusResponse};

/// Serves canned responses keyed by full URL.
///
/// URLs without a response behave like a refused connection. Every request
/// is recorded so tests can check how many calls were made.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, StatusResponse>,
    unreachable: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response returned for `url`.
    pub fn add_response(&mut self, url: impl Into<String>, response: StatusResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Shorthand for a 200 JSON response.
    pub fn add_json(&mut self, url: impl Into<String>, body: &str) {
        self.add_response(url, StatusResponse::ok(Some("application/json"), body));
    }

    /// Makes `url` fail as if the request timed out.
    pub fn add_timeout(&mut self, url: impl Into<String>) {
        self.unreachable.insert(url.into());
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl StatusFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<StatusResponse, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        if self.unreachable.contains(url) {
            return Err(FetchError::Request {
                url: url.to_string(),
                reason: "timed out".to_string(),
            });
        }

        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Request {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fetcher_serves_responses() {
        let mut fetcher = MockFetcher::new();
        fetcher.add_json("http://localhost/status", "{}");

        let resp = fetcher.fetch("http://localhost/status").unwrap();
        assert_eq!(resp.status, 200);
        assert!(resp.is_json());
        assert_eq!(resp.body, b"{}");
    }

    #[test]
    fn test_mock_fetcher_failures() {
        let mut fetcher = MockFetcher::new();
        fetcher.add_timeout("http://localhost/slow");

        assert!(fetcher.fetch("http://localhost/slow").is_err());
        assert!(fetcher.fetch("http://localhost/missing").is_err());
        assert_eq!(
            fetcher.requests(),
            vec!["http://localhost/slow", "http://localhost/missing"]
        );
    }
}
