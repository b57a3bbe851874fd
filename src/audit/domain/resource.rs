use super::resource_id::{
    resource_group_from_resource_id, resource_name_from_resource_id,
    resource_type_from_resource_id, subscription_from_resource_id,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A discovered item, as listed in the inventory and out-of-scope tables
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resource {
    pub id: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub location: String,
    /// Canonical lower-cased type
    pub resource_type: String,
    pub name: String,
    pub sku_name: String,
    pub sku_tier: String,
    pub kind: String,
}

impl Resource {
    /// Builds a resource from a graph row. Missing columns fall back to
    /// values sliced from the id; a row without `id` yields `None`.
    pub fn from_graph_row(row: &Map<String, Value>) -> Option<Self> {
        let id = string_field(row, "id");
        if id.is_empty() {
            return None;
        }

        let pick = |key: &str, fallback: fn(&str) -> String| {
            let value = string_field(row, key);
            if value.is_empty() {
                fallback(&id)
            } else {
                value
            }
        };

        Some(Self {
            subscription_id: pick("subscriptionId", subscription_from_resource_id),
            resource_group: pick("resourceGroup", resource_group_from_resource_id),
            location: string_field(row, "location"),
            resource_type: pick("type", resource_type_from_resource_id).to_lowercase(),
            name: pick("name", resource_name_from_resource_id),
            sku_name: string_field(row, "skuName"),
            sku_tier: string_field(row, "skuTier"),
            kind: string_field(row, "kind"),
            id,
        })
    }
}

/// A fully hydrated resource handed to code rules
#[derive(Debug, Clone, Default)]
pub struct ResourceInstance {
    pub resource: Resource,
    pub tags: BTreeMap<String, String>,
    pub zones: Vec<String>,
    pub properties: Value,
}

impl ResourceInstance {
    /// Hydrates an instance from a `resources` table row carrying the raw
    /// `sku`, `tags`, `zones` and `properties` columns.
    pub fn from_graph_row(row: &Map<String, Value>) -> Option<Self> {
        let mut resource = Resource::from_graph_row(row)?;
        if let Some(sku) = row.get("sku").and_then(Value::as_object) {
            resource.sku_name = string_field(sku, "name");
            resource.sku_tier = string_field(sku, "tier");
        }

        let tags = row
            .get("tags")
            .and_then(Value::as_object)
            .map(|tags| {
                tags.iter()
                    .map(|(k, v)| (k.clone(), value_to_string(v)))
                    .collect()
            })
            .unwrap_or_default();

        let zones = row
            .get("zones")
            .and_then(Value::as_array)
            .map(|zones| zones.iter().map(value_to_string).collect())
            .unwrap_or_default();

        Some(Self {
            resource,
            tags,
            zones,
            properties: row.get("properties").cloned().unwrap_or(Value::Null),
        })
    }

    pub fn id(&self) -> &str {
        &self.resource.id
    }

    pub fn name(&self) -> &str {
        &self.resource.name
    }

    /// Looks up a nested property by dotted path (`networkAcls.defaultAction`)
    pub fn property(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.properties, |value, key| value.get(key))
    }

    pub fn property_str(&self, path: &str) -> Option<&str> {
        self.property(path).and_then(Value::as_str)
    }

    pub fn property_bool(&self, path: &str) -> Option<bool> {
        self.property(path).and_then(Value::as_bool)
    }
}

/// Subscription x type count joined with catalog coverage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeCount {
    pub subscription_id: String,
    pub subscription_name: String,
    pub resource_type: String,
    pub count: u64,
    pub covered_by_catalog: bool,
}

/// Reads a column as a display string; null and missing become empty.
pub fn string_field(row: &Map<String, Value>, key: &str) -> String {
    row.get(key).map(value_to_string).unwrap_or_default()
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
