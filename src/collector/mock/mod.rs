//! Mock status server for testing.
//!
//! This module provides `MockFetcher` and pre-built scenarios for testing
//! the collector without a running nginx.

mod fetcher;
mod scenarios;

pub use fetcher::MockFetcher;
pub use scenarios::{
    API_CONNECTIONS, API_HTTP_REQUESTS, API_NGINX, API_ROOT, API_SSL, PLUS_STATUS, STUB_STATUS,
};
