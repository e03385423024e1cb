//! ngxprobe - nginx inventory and status collector.
//!
//! Runs one collection cycle: parses the nginx configuration into inventory,
//! polls the status URL for metrics and writes the result as JSON to stdout.
//! Logs go to stderr.
//!
//! Usage:
//!   ngxprobe                                        # both, auto-detect module
//!   ngxprobe --metrics --status-url http://h/status # metrics only
//!   ngxprobe --inventory --config-path ./nginx.conf # inventory only
//!   ngxprobe --status-module ngx_http_api_module --status-url http://h/api/6

use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use ngxprobe::collector::{Collector, HttpFetcher};
use ngxprobe::config::{
    CollectorConfig, DEFAULT_API_ENDPOINTS, DEFAULT_CONFIG_PATH, DEFAULT_STATUS_URL, StatusModule,
};
use ngxprobe::publish::JsonSink;

/// nginx inventory and status collector.
#[derive(Parser)]
#[command(name = "ngxprobe", about = "nginx inventory and status collector", version)]
struct Args {
    /// URL of the status page (stub status, status or API root).
    #[arg(long, env = "STATUS_URL", default_value = DEFAULT_STATUS_URL)]
    status_url: String,

    /// Path to the nginx configuration file.
    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    config_path: String,

    /// Timeout for each status request, in seconds.
    #[arg(long, env = "CONNECTION_TIMEOUT", default_value = "5")]
    connection_timeout: u64,

    /// Status module exposed by the server: discover, ngx_http_stub_status_module,
    /// ngx_http_status_module or ngx_http_api_module.
    #[arg(long, env = "STATUS_MODULE", default_value = "discover")]
    status_module: StatusModule,

    /// Verify TLS certificates of the status endpoint.
    #[arg(long, env = "VALIDATE_CERTS", default_value_t = true, action = ArgAction::Set)]
    validate_certs: bool,

    /// Report a remote `host:port` entity instead of the local host.
    #[arg(long, env = "REMOTE_MONITORING")]
    remote_monitoring: bool,

    /// Comma-separated API sub-paths polled by ngx_http_api_module.
    #[arg(long, env = "STATUS_ENDPOINTS", value_delimiter = ',')]
    status_endpoints: Vec<String>,

    /// Collect only metrics.
    #[arg(long, env = "METRICS")]
    metrics: bool,

    /// Collect only inventory.
    #[arg(long, env = "INVENTORY")]
    inventory: bool,

    /// Pretty-print the JSON output.
    #[arg(long, env = "PRETTY")]
    pretty: bool,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Enable debug logging, same as -v.
    #[arg(long, env = "VERBOSE")]
    debug: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn collector_config(&self) -> CollectorConfig {
        let both = !self.metrics && !self.inventory;
        let api_endpoints = if self.status_endpoints.is_empty() {
            DEFAULT_API_ENDPOINTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.status_endpoints
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        CollectorConfig {
            status_url: self.status_url.clone(),
            config_path: self.config_path.clone().into(),
            timeout: Duration::from_secs(self.connection_timeout),
            status_module: self.status_module,
            validate_certs: self.validate_certs,
            remote_monitoring: self.remote_monitoring,
            api_endpoints,
            inventory: both || self.inventory,
            metrics: both || self.metrics,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ngxprobe={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    let verbose = if args.debug {
        args.verbose.max(1)
    } else {
        args.verbose
    };
    init_logging(verbose, args.quiet);

    let config = args.collector_config();
    info!("ngxprobe {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: status_url={}, module={}, config_path={}, timeout={}s",
        config.status_url,
        config.status_module,
        config.config_path.display(),
        config.timeout.as_secs()
    );

    let fetcher = match HttpFetcher::new(config.timeout, config.validate_certs) {
        Ok(f) => f,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let collector = Collector::new(fetcher, config);
    let mut sink = JsonSink::new(std::io::stdout().lock(), args.pretty);
    if let Err(e) = collector.run(&mut sink) {
        error!("{}", e);
        std::process::exit(1);
    }
}
