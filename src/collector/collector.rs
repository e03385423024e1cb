//! Main collector that drives one inventory parse and one status poll.
//!
//! The `Collector` picks the status decoder from the configured module (or
//! discovers it from the first response) and maps the result into a
//! [`MetricSet`].

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::collector::traits::{FetchError, StatusFetcher, StatusResponse};
use crate::config::{CollectorConfig, StatusModule, UrlError};
use crate::inventory::{ConfigError, Inventory, read_config_file};
use crate::metrics::{
    MetricSet, PLUS_METRICS, STUB_METRICS, populate_api_metrics, populate_metrics,
};
use crate::publish::{self, PublishError, PublishSink};
use crate::status::{
    RawValue, StatusError, decode_object, flatten_object, parse_plus_status, parse_stub_status,
};

/// Token in the API root listing that identifies `ngx_http_api_module`.
const API_ROOT_MARKER: &str = "\"nginx\"";

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to get stats from {url}. Server returned code {code}. Expecting 200")]
    BadStatus { url: String, code: u16 },

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Collects inventory and metrics from one nginx instance.
pub struct Collector<F: StatusFetcher> {
    fetcher: F,
    config: CollectorConfig,
}

impl<F: StatusFetcher> Collector<F> {
    pub fn new(fetcher: F, config: CollectorConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs one collection cycle and hands the result to `sink`.
    ///
    /// Inventory and metrics are gathered according to the config flags.
    /// Any fatal error aborts the cycle before anything is published.
    pub fn run(&self, sink: &mut dyn PublishSink) -> Result<(), CollectError> {
        let entity = publish::entity(&self.config)?;
        let inventory = if self.config.inventory {
            self.collect_inventory()?
        } else {
            Inventory::new()
        };
        let set = if self.config.metrics {
            let mut set = publish::metric_set(&self.config)?;
            self.collect_metrics(&mut set)?;
            set
        } else {
            MetricSet::new(publish::EVENT_TYPE)
        };
        sink.publish(&entity, &inventory, &set)?;
        info!(
            inventory = inventory.len(),
            metrics = set.len(),
            "published {}",
            self.config.status_url
        );
        Ok(())
    }

    /// Parses the configuration file into an inventory.
    pub fn collect_inventory(&self) -> Result<Inventory, CollectError> {
        let start = Instant::now();
        let inventory = read_config_file(&self.config.config_path)?;
        debug!(
            items = inventory.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "parsed {}",
            self.config.config_path.display()
        );
        Ok(inventory)
    }

    /// Polls the status surface and stores the resulting metrics in `set`.
    pub fn collect_metrics(&self, set: &mut MetricSet) -> Result<(), CollectError> {
        let start = Instant::now();
        let result = match self.config.status_module {
            StatusModule::StubStatus => {
                let response = self.get_status("")?;
                self.collect_stub(&response, set)
            }
            StatusModule::Status => {
                let response = self.get_status("")?;
                self.collect_plus(&response, set)
            }
            StatusModule::Api => {
                self.poll_api_endpoints(set);
                Ok(())
            }
            StatusModule::Discover => self.collect_discovered(set),
        };
        debug!(
            metrics = set.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "status poll finished"
        );
        result
    }

    /// Fetches `status_url + path`, requiring a 200 response.
    fn get_status(&self, path: &str) -> Result<StatusResponse, CollectError> {
        let url = self.config.endpoint_url(path);
        let response = self.fetcher.fetch(&url)?;
        if response.status != 200 {
            return Err(CollectError::BadStatus {
                url,
                code: response.status,
            });
        }
        Ok(response)
    }

    fn collect_stub(
        &self,
        response: &StatusResponse,
        set: &mut MetricSet,
    ) -> Result<(), CollectError> {
        let mut raw = parse_stub_status(response.body.as_slice())?;
        let version = response
            .server
            .as_deref()
            .unwrap_or_default()
            .replace("nginx/", "");
        raw.insert("version".to_string(), RawValue::Text(version));
        populate_metrics(set, &raw, STUB_METRICS);
        Ok(())
    }

    fn collect_plus(
        &self,
        response: &StatusResponse,
        set: &mut MetricSet,
    ) -> Result<(), CollectError> {
        let raw = parse_plus_status(response.body.as_slice())?;
        populate_metrics(set, &raw, PLUS_METRICS);
        Ok(())
    }

    /// Picks the decoder from the shape of the status response.
    fn collect_discovered(&self, set: &mut MetricSet) -> Result<(), CollectError> {
        let response = self.get_status("")?;

        if !response.is_json() {
            debug!("discovered {}", StatusModule::StubStatus);
            return self.collect_stub(&response, set);
        }

        let body = String::from_utf8_lossy(&response.body);
        if body.contains(API_ROOT_MARKER) {
            info!("discovered {}", StatusModule::Api);
            self.poll_api_endpoints(set);
            return Ok(());
        }

        debug!("discovered {}", StatusModule::Status);
        self.collect_plus(&response, set)
    }

    /// Polls every configured API endpoint.
    ///
    /// An endpoint that can't be fetched or decoded is logged and skipped;
    /// the others are still collected.
    fn poll_api_endpoints(&self, set: &mut MetricSet) {
        let mut stored = 0;
        for path in &self.config.api_endpoints {
            match self.collect_api_endpoint(path, set) {
                Ok(n) => stored += n,
                Err(e) => warn!("request to endpoint {} failed: {}", path, e),
            }
        }
        if stored == 0 {
            warn!("no metrics collected from any API endpoint");
        }
    }

    fn collect_api_endpoint(
        &self,
        path: &str,
        set: &mut MetricSet,
    ) -> Result<usize, CollectError> {
        let response = self.get_status(path)?;
        let object = decode_object(response.body.as_slice())?;
        let flat = flatten_object(&object);
        Ok(populate_api_metrics(set, path, &flat))
    }
}
