//! Tabular projection shared by every renderer
//!
//! A table is a header row plus string cells. Renderers never look at the
//! domain types; they only see tables.

use crate::audit::services::subscription_mask::{
    mask_subscription_id, mask_subscription_in_resource_id,
};
use serde_json::{Map, Value};

/// Columns holding a bare subscription id
const SUBSCRIPTION_COLUMNS: [&str; 2] = ["Subscription Id", "Subscription"];
/// Columns holding a fully qualified resource id
const RESOURCE_ID_COLUMNS: [&str; 2] = ["Id", "Resource Id"];

/// One report table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    /// JSON key and CSV file stem, e.g. `resourceType`
    pub key: String,
    /// Human title used by the document renderer
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Whether the stage feeding this table was part of the run
    pub enabled: bool,
}

impl ReportTable {
    pub fn new(key: impl Into<String>, title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Rewrites subscription and resource id columns so only the last four
    /// characters of each subscription id stay visible.
    pub fn mask_subscriptions(&mut self) {
        let subscription_columns: Vec<usize> = SUBSCRIPTION_COLUMNS
            .iter()
            .filter_map(|h| self.column(h))
            .collect();
        let resource_columns: Vec<usize> = RESOURCE_ID_COLUMNS
            .iter()
            .filter_map(|h| self.column(h))
            .collect();

        for row in &mut self.rows {
            for &i in &subscription_columns {
                if let Some(cell) = row.get_mut(i) {
                    *cell = mask_subscription_id(cell, true);
                }
            }
            for &i in &resource_columns {
                if let Some(cell) = row.get_mut(i) {
                    *cell = mask_subscription_in_resource_id(cell, true);
                }
            }
        }
    }

    /// Rows as JSON objects keyed by camel-cased header names
    pub fn to_json_rows(&self) -> Vec<Value> {
        let keys: Vec<String> = self.headers.iter().map(|h| camel_case(h)).collect();
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = keys
                    .iter()
                    .zip(row.iter())
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

/// `"Number of Resources"` to `"numberOfResources"`, `"SLA"` to `"sla"`
pub fn camel_case(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let words = header
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty());

    for (i, word) in words.enumerate() {
        if i == 0 {
            if word.chars().all(|c| !c.is_ascii_lowercase()) {
                out.push_str(&word.to_lowercase());
            } else {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_lowercase());
                    out.push_str(chars.as_str());
                }
            }
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}
