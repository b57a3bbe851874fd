//! Stub collaborators for unit tests of the stages and the pipeline.

use super::rate_limiter::RateLimiter;
use super::scan_context::ScanContext;
use super::scan_services::ScanServices;
use super::scanner_registry::ScannerRegistry;
use crate::adapters::outbound::scanners::builtin_scanners;
use crate::audit::domain::{Filters, PluginDefinition};
use crate::audit::services::Catalog;
use crate::ports::outbound::{
    CarbonEmissionItem, CloudApiError, DefenderPricing, GraphQuery, GraphRow, ManagementApi,
    ProgressReporter, ServiceCost, SubscriptionInfo,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub fn rows(values: Vec<Value>) -> Vec<GraphRow> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

/// Answers each query with the rows of the first registered fragment it
/// contains; unmatched queries return no rows.
#[derive(Default)]
pub struct StubGraph {
    responses: Vec<(String, Result<Vec<GraphRow>, CloudApiError>)>,
    pub queries: Mutex<Vec<(String, Vec<String>)>>,
}

impl StubGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, fragment: &str, values: Vec<Value>) -> Self {
        self.responses.push((fragment.to_string(), Ok(rows(values))));
        self
    }

    pub fn fail(mut self, fragment: &str, error: CloudApiError) -> Self {
        self.responses.push((fragment.to_string(), Err(error)));
        self
    }

    pub fn recorded(&self) -> Vec<(String, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphQuery for StubGraph {
    async fn query(
        &self,
        query: &str,
        subscriptions: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), subscriptions.to_vec()));
        self.responses
            .iter()
            .find(|(fragment, _)| query.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn query_management_groups(
        &self,
        query: &str,
        management_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.query(query, management_groups, cancel).await
    }
}

#[derive(Default)]
pub struct StubManagement {
    pub subscriptions: Vec<SubscriptionInfo>,
    pub diagnostics: HashMap<String, usize>,
    pub costs: HashMap<String, Vec<ServiceCost>>,
    pub carbon: Vec<CarbonEmissionItem>,
    pub pricings: HashMap<String, Result<Vec<DefenderPricing>, CloudApiError>>,
    pub failure: Option<CloudApiError>,
    pub carbon_windows: Mutex<Vec<(NaiveDate, NaiveDate, usize)>>,
    pub cost_windows: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl StubManagement {
    pub fn with_subscriptions(subscriptions: &[(&str, &str, &str)]) -> Self {
        Self {
            subscriptions: subscriptions
                .iter()
                .map(|(id, name, state)| SubscriptionInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                    state: state.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), CloudApiError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ManagementApi for StubManagement {
    async fn list_subscriptions(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SubscriptionInfo>, CloudApiError> {
        self.check()?;
        Ok(self.subscriptions.clone())
    }

    async fn diagnostic_settings_count(
        &self,
        resource_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<usize, CloudApiError> {
        self.check()?;
        Ok(self.diagnostics.get(resource_id).copied().unwrap_or(0))
    }

    async fn query_costs(
        &self,
        subscription_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ServiceCost>, CloudApiError> {
        self.check()?;
        self.cost_windows
            .lock()
            .unwrap()
            .push((subscription_id.to_string(), from, to));
        Ok(self.costs.get(subscription_id).cloned().unwrap_or_default())
    }

    async fn query_carbon_emissions(
        &self,
        subscriptions: &[String],
        from: NaiveDate,
        to: NaiveDate,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CarbonEmissionItem>, CloudApiError> {
        self.check()?;
        self.carbon_windows
            .lock()
            .unwrap()
            .push((from, to, subscriptions.len()));
        Ok(self.carbon.clone())
    }

    async fn list_defender_pricings(
        &self,
        subscription_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<DefenderPricing>, CloudApiError> {
        self.check()?;
        self.pricings
            .get(subscription_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&self, _message: &str) {}
    fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
    fn report_completion(&self, _message: &str) {}
}

pub fn services(
    graph: Arc<dyn GraphQuery>,
    management: Arc<dyn ManagementApi>,
    catalog: Catalog,
    plugins: Vec<PluginDefinition>,
) -> Arc<ScanServices> {
    Arc::new(ScanServices {
        graph,
        management,
        limiter: Arc::new(RateLimiter::for_resource_graph()),
        catalog: Arc::new(catalog),
        scanners: ScannerRegistry::new(builtin_scanners()),
        plugins,
        progress: Arc::new(SilentProgress),
    })
}

/// Context over `services` with one subscription `S1` ("Production")
pub fn context_for(services: Arc<ScanServices>, filters: Filters) -> ScanContext {
    let mut ctx = ScanContext::new(services, filters, CancellationToken::new());
    ctx.set_subscriptions([("S1".to_string(), "Production".to_string())]);
    ctx
}

pub fn context_with(
    graph: Arc<StubGraph>,
    management: Arc<StubManagement>,
    filters: Filters,
) -> ScanContext {
    context_for(
        services(graph, management, Catalog::new(), Vec::new()),
        filters,
    )
}

pub fn context() -> ScanContext {
    context_with(
        Arc::new(StubGraph::new()),
        Arc::new(StubManagement::default()),
        Filters::new(),
    )
}
