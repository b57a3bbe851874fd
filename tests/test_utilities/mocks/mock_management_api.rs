use async_trait::async_trait;
use azqr::ports::outbound::{
    CarbonEmissionItem, CloudApiError, DefenderPricing, ManagementApi, ServiceCost,
    SubscriptionInfo,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Mock ManagementApi for testing
#[derive(Default, Clone)]
pub struct MockManagementApi {
    pub subscriptions: Vec<SubscriptionInfo>,
    pub costs: HashMap<String, Vec<ServiceCost>>,
    pub carbon: Vec<CarbonEmissionItem>,
    pub should_fail: bool,
    /// (subscription, from, to) of every cost query
    pub cost_queries: Arc<Mutex<Vec<(String, NaiveDate, NaiveDate)>>>,
}

impl MockManagementApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(mut self, id: &str, name: &str, state: &str) -> Self {
        self.subscriptions.push(SubscriptionInfo {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
        });
        self
    }

    pub fn with_cost(mut self, subscription_id: &str, service: &str, value: f64) -> Self {
        self.costs
            .entry(subscription_id.to_string())
            .or_default()
            .push(ServiceCost {
                service_name: service.to_string(),
                value,
                currency: "EUR".to_string(),
            });
        self
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn get_cost_queries(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.cost_queries.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CloudApiError> {
        if self.should_fail {
            return Err(CloudApiError::Unauthenticated(
                "Mock management api failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for MockManagementApi {
    async fn list_subscriptions(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SubscriptionInfo>, CloudApiError> {
        self.check()?;
        Ok(self.subscriptions.clone())
    }

    async fn diagnostic_settings_count(
        &self,
        _resource_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<usize, CloudApiError> {
        self.check()?;
        Ok(1)
    }

    async fn query_costs(
        &self,
        subscription_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ServiceCost>, CloudApiError> {
        self.check()?;
        self.cost_queries
            .lock()
            .unwrap()
            .push((subscription_id.to_string(), from, to));
        Ok(self.costs.get(subscription_id).cloned().unwrap_or_default())
    }

    async fn query_carbon_emissions(
        &self,
        _subscriptions: &[String],
        _from: NaiveDate,
        _to: NaiveDate,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CarbonEmissionItem>, CloudApiError> {
        self.check()?;
        Ok(self.carbon.clone())
    }

    async fn list_defender_pricings(
        &self,
        _subscription_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<DefenderPricing>, CloudApiError> {
        self.check()?;
        Ok(Vec::new())
    }
}
