use super::pipeline::StageMetrics;
use super::scan_services::ScanServices;
use crate::audit::domain::{AuxiliaryIndexes, Filters, ReportData};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-run state carried through the pipeline
///
/// The pipeline owns the context and lends it to one stage at a time.
/// Stages that fan out write results back only through their own collector.
pub struct ScanContext {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub filters: Filters,
    /// Management groups to discover subscriptions from, when given
    pub management_groups: Vec<String>,
    /// Lookups written by preflight, read by the rule stages
    pub indexes: AuxiliaryIndexes,
    pub report: ReportData,
    pub metrics: BTreeMap<String, StageMetrics>,
    pub cancel: CancellationToken,
    pub services: Arc<ScanServices>,
    subscriptions: BTreeMap<String, String>,
    names_by_lower_id: HashMap<String, String>,
}

impl ScanContext {
    pub fn new(services: Arc<ScanServices>, filters: Filters, cancel: CancellationToken) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            started_at: Utc::now(),
            filters,
            management_groups: Vec::new(),
            indexes: AuxiliaryIndexes::new(),
            report: ReportData::default(),
            metrics: BTreeMap::new(),
            cancel,
            services,
            subscriptions: BTreeMap::new(),
            names_by_lower_id: HashMap::new(),
        }
    }

    /// Replaces the active subscription set (id to display name)
    pub fn set_subscriptions<I>(&mut self, subscriptions: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.subscriptions = subscriptions.into_iter().collect();
        self.names_by_lower_id = self
            .subscriptions
            .iter()
            .map(|(id, name)| (id.to_lowercase(), name.clone()))
            .collect();
    }

    pub fn subscriptions(&self) -> &BTreeMap<String, String> {
        &self.subscriptions
    }

    pub fn subscription_ids(&self) -> Vec<String> {
        self.subscriptions.keys().cloned().collect()
    }

    /// Display name for a subscription; empty when unknown
    pub fn subscription_name(&self, subscription_id: &str) -> &str {
        self.names_by_lower_id
            .get(&subscription_id.to_lowercase())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Lower-cased id to display name, for handing to worker tasks
    pub fn subscription_names(&self) -> &HashMap<String, String> {
        &self.names_by_lower_id
    }
}
