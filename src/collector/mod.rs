//! nginx inventory and status collector.
//!
//! This module drives one collection cycle: it parses the nginx
//! configuration file and polls the status surface over HTTP, with support
//! for mocking the HTTP side in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  collect_inventory  │   │      collect_metrics        │  │
//! │  │  - nginx.conf       │   │  - stub status (text)       │  │
//! │  └─────────────────────┘   │  - status (JSON)            │  │
//! │                            │  - API (multi-endpoint)     │  │
//! │                            └──────────────┬──────────────┘  │
//! │                                           │                 │
//! │                                   ┌───────▼───────┐         │
//! │                                   │ StatusFetcher │ (trait) │
//! │                                   └───────┬───────┘         │
//! └───────────────────────────────────────────┼─────────────────┘
//!                                             │
//!                             ┌───────────────┼───────────────┐
//!                             │               │               │
//!                      ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!                      │ HttpFetcher │ │ MockFetcher │ │  Scenarios  │
//!                      │ (reqwest)   │ │ (Testing)   │ │ (Fixtures)  │
//!                      └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use ngxprobe::collector::{Collector, HttpFetcher};
//! use ngxprobe::config::CollectorConfig;
//! use ngxprobe::publish::JsonSink;
//!
//! let config = CollectorConfig::default();
//! let fetcher = HttpFetcher::new(config.timeout, config.validate_certs).unwrap();
//! let collector = Collector::new(fetcher, config);
//! collector.run(&mut JsonSink::new(std::io::stdout(), false)).unwrap();
//! ```
//!
//! ## Testing (with MockFetcher)
//!
//! ```
//! use ngxprobe::collector::{Collector, MockFetcher};
//! use ngxprobe::config::CollectorConfig;
//! use ngxprobe::metrics::MetricSet;
//!
//! let config = CollectorConfig::default();
//! let fetcher = MockFetcher::stub_server(&config.status_url);
//! let collector = Collector::new(fetcher, config);
//! let mut set = MetricSet::new("NginxSample");
//! collector.collect_metrics(&mut set).unwrap();
//! assert!(!set.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod traits;

pub use collector::{CollectError, Collector};
pub use mock::MockFetcher;
pub use traits::{FetchError, HttpFetcher, StatusFetcher, StatusResponse};
