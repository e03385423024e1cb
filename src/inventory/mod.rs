//! Static configuration inventory.
//!
//! The inventory is the flattened view of the proxy's configuration file:
//! every statement becomes one item addressed by the `/`-joined path of the
//! blocks that enclose it.

pub mod parser;

pub use parser::{ConfigError, parse_config, read_config_file};

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::SerializeMap;

/// Field name used for configuration statements.
pub const VALUE_FIELD: &str = "value";

/// A single inventory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub path: Vec<String>,
    pub field: String,
    pub value: String,
}

impl InventoryItem {
    /// Returns the path segments joined with `/`.
    pub fn key(&self) -> String {
        self.path.join("/")
    }
}

/// Inventory collected from one configuration parse.
///
/// Items are keyed by their joined path; a later write for the same path
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<String, InventoryItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an item, overwriting any previous item with the same path.
    pub fn set_item(
        &mut self,
        path: Vec<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        let item = InventoryItem {
            path,
            field: field.into(),
            value: value.into(),
        };
        self.items.insert(item.key(), item);
    }

    /// Looks up the value stored under a `/`-joined path.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|item| item.value.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&InventoryItem> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items in path order.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }
}

// Published as `{"path": {"value": "..."}}`.
impl Serialize for Inventory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, item) in &self.items {
            let mut fields = BTreeMap::new();
            fields.insert(item.field.as_str(), item.value.as_str());
            map.serialize_entry(key, &fields)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut inv = Inventory::new();
        inv.set_item(vec!["http".into(), "listen".into()], VALUE_FIELD, "80");
        inv.set_item(vec!["http".into(), "listen".into()], VALUE_FIELD, "443");
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.value("http/listen"), Some("443"));
    }

    #[test]
    fn test_serialize_shape() {
        let mut inv = Inventory::new();
        inv.set_item(vec!["pid".into()], VALUE_FIELD, "/run/nginx.pid");
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["pid"]["value"], "/run/nginx.pid");
    }
}
