//! ngxprobe - nginx inventory and status collector library.
//!
//! This library provides everything the `ngxprobe` binary runs in one cycle:
//! - `inventory` - nginx configuration file parser
//! - `status` - decoders for the three status module formats
//! - `metrics` - metric definitions and mapping of raw status values
//! - `collector` - HTTP polling and orchestration
//! - `publish` - entity identity and the JSON output sink

pub mod collector;
pub mod config;
pub mod inventory;
pub mod metrics;
pub mod publish;
pub mod status;
