//! Entity identity and the sink that publishes collected data.
//!
//! The JSON payload carries one entity with its inventory, metric sample and
//! the kind of every metric, so the backend can turn RATE and DELTA counters
//! into per-interval values.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::config::{CollectorConfig, UrlError, parse_status_url};
use crate::inventory::Inventory;
use crate::metrics::{MetricKind, MetricSet};

pub const INTEGRATION_NAME: &str = "com.nginx.probe";
pub const PROTOCOL_VERSION: &str = "3";
pub const EVENT_TYPE: &str = "NginxSample";

const REMOTE_ENTITY_TYPE: &str = "server";

/// The monitored entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// The host the collector runs on.
    Local,
    /// A server identified by `host:port`.
    Remote { name: String, entity_type: String },
}

/// Builds the entity for the configured status URL.
pub fn entity(config: &CollectorConfig) -> Result<Entity, UrlError> {
    if !config.remote_monitoring {
        return Ok(Entity::Local);
    }
    let (host, port) = parse_status_url(&config.status_url)?;
    Ok(Entity::Remote {
        name: format!("{}:{}", host, port),
        entity_type: REMOTE_ENTITY_TYPE.to_string(),
    })
}

/// Creates an empty metric set tagged with the status URL's port, and its
/// hostname when monitoring remotely.
pub fn metric_set(config: &CollectorConfig) -> Result<MetricSet, UrlError> {
    let (host, port) = parse_status_url(&config.status_url)?;
    let set = MetricSet::new(EVENT_TYPE);
    Ok(if config.remote_monitoring {
        set.with_attribute("hostname", host).with_attribute("port", port)
    } else {
        set.with_attribute("port", port)
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write payload: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives the result of one collection cycle.
pub trait PublishSink {
    fn publish(
        &mut self,
        entity: &Entity,
        inventory: &Inventory,
        metrics: &MetricSet,
    ) -> Result<(), PublishError>;
}

#[derive(Serialize)]
struct Payload<'a> {
    name: &'static str,
    protocol_version: &'static str,
    integration_version: &'static str,
    timestamp: i64,
    data: Vec<EntityData<'a>>,
}

#[derive(Serialize)]
struct EntityData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<EntityId<'a>>,
    metrics: Vec<&'a MetricSet>,
    metric_types: BTreeMap<&'a str, MetricKind>,
    inventory: &'a Inventory,
    events: Vec<()>,
}

#[derive(Serialize)]
struct EntityId<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    entity_type: &'a str,
}

/// Writes each cycle as one JSON document followed by a newline.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PublishSink for JsonSink<W> {
    fn publish(
        &mut self,
        entity: &Entity,
        inventory: &Inventory,
        metrics: &MetricSet,
    ) -> Result<(), PublishError> {
        let entity = match entity {
            Entity::Local => None,
            Entity::Remote { name, entity_type } => Some(EntityId { name, entity_type }),
        };
        let payload = Payload {
            name: INTEGRATION_NAME,
            protocol_version: PROTOCOL_VERSION,
            integration_version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().timestamp(),
            data: vec![EntityData {
                entity,
                metrics: if metrics.is_empty() { Vec::new() } else { vec![metrics] },
                metric_types: metrics.kinds(),
                inventory,
                events: Vec::new(),
            }],
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &payload)?;
        } else {
            serde_json::to_writer(&mut self.writer, &payload)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::VALUE_FIELD;
    use crate::status::RawValue;

    fn remote_config() -> CollectorConfig {
        CollectorConfig {
            status_url: "https://nginx.example.com:8443/status".to_string(),
            remote_monitoring: true,
            ..CollectorConfig::default()
        }
    }

    #[test]
    fn test_entity() {
        assert_eq!(entity(&CollectorConfig::default()), Ok(Entity::Local));
        assert_eq!(
            entity(&remote_config()),
            Ok(Entity::Remote {
                name: "nginx.example.com:8443".to_string(),
                entity_type: "server".to_string(),
            })
        );
    }

    #[test]
    fn test_metric_set_attributes() {
        let local = metric_set(&CollectorConfig::default()).unwrap();
        assert_eq!(local.event_type(), EVENT_TYPE);
        assert_eq!(local.attributes().get("port").map(String::as_str), Some("80"));
        assert!(!local.attributes().contains_key("hostname"));

        let remote = metric_set(&remote_config()).unwrap();
        assert_eq!(
            remote.attributes().get("hostname").map(String::as_str),
            Some("nginx.example.com")
        );
        assert_eq!(remote.attributes().get("port").map(String::as_str), Some("8443"));
    }

    #[test]
    fn test_metric_set_rejects_bad_url() {
        let config = CollectorConfig {
            status_url: "unix:///var/run/nginx.sock".to_string(),
            ..CollectorConfig::default()
        };
        assert_eq!(metric_set(&config), Err(UrlError::UnsupportedScheme));
    }

    #[test]
    fn test_json_sink_payload() {
        let mut inventory = Inventory::new();
        inventory.set_item(vec!["user".into()], VALUE_FIELD, "nginx");
        let mut metrics = metric_set(&remote_config()).unwrap();
        metrics
            .set_metric("net.requestsPerSecond", &RawValue::Int(10), MetricKind::Rate)
            .unwrap();

        let mut sink = JsonSink::new(Vec::new(), false);
        sink.publish(&entity(&remote_config()).unwrap(), &inventory, &metrics)
            .unwrap();
        let out = sink.into_inner();
        assert_eq!(out.last(), Some(&b'\n'));

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["name"], INTEGRATION_NAME);
        let data = &json["data"][0];
        assert_eq!(data["entity"]["name"], "nginx.example.com:8443");
        assert_eq!(data["entity"]["type"], "server");
        assert_eq!(data["metrics"][0]["event_type"], "NginxSample");
        assert_eq!(data["metrics"][0]["net.requestsPerSecond"], 10);
        assert_eq!(data["metric_types"]["net.requestsPerSecond"], "RATE");
        assert_eq!(data["inventory"]["user"]["value"], "nginx");
    }

    #[test]
    fn test_json_sink_local_without_metrics() {
        let mut sink = JsonSink::new(Vec::new(), true);
        sink.publish(&Entity::Local, &Inventory::new(), &MetricSet::new(EVENT_TYPE))
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        let data = &json["data"][0];
        assert!(data.get("entity").is_none());
        assert_eq!(data["metrics"].as_array().map(Vec::len), Some(0));
    }
}
