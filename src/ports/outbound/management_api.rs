use super::CloudApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub id: String,
    pub name: String,
    pub state: String,
}

impl SubscriptionInfo {
    pub fn is_enabled(&self) -> bool {
        self.state.eq_ignore_ascii_case("enabled")
    }
}

/// One row of a cost query grouped by service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCost {
    pub service_name: String,
    pub value: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarbonEmissionItem {
    pub resource_type: String,
    pub latest_month: f64,
    pub previous_month: Option<f64>,
    pub monthly_change_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenderPricing {
    pub name: String,
    pub tier: String,
    pub deprecated: bool,
}

/// ManagementApi port for the resource manager endpoints the scan needs
/// outside the resource graph.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Lists every subscription the caller can see
    async fn list_subscriptions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubscriptionInfo>, CloudApiError>;

    /// Number of diagnostic settings configured on a resource
    async fn diagnostic_settings_count(
        &self,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, CloudApiError>;

    /// Actual cost per service for a subscription over `[from, to]`
    async fn query_costs(
        &self,
        subscription_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<ServiceCost>, CloudApiError>;

    /// Emissions per resource type for a batch of subscriptions
    async fn query_carbon_emissions(
        &self,
        subscriptions: &[String],
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<CarbonEmissionItem>, CloudApiError>;

    /// Defender for Cloud plans on a subscription
    async fn list_defender_pricings(
        &self,
        subscription_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DefenderPricing>, CloudApiError>;
}
