use super::http::{self, MANAGEMENT_ENDPOINT};
use super::retry::RetryPolicy;
use crate::ports::outbound::{
    CarbonEmissionItem, CloudApiError, DefenderPricing, ManagementApi, ServiceCost,
    SubscriptionInfo, TokenProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
const DIAGNOSTICS_API_VERSION: &str = "2021-05-01-preview";
const COST_API_VERSION: &str = "2023-03-01";
const CARBON_API_VERSION: &str = "2025-04-01";
const PRICINGS_API_VERSION: &str = "2024-01-01";

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionEntry {
    subscription_id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct CostQueryResponse {
    properties: CostQueryProperties,
}

#[derive(Debug, Deserialize)]
struct CostQueryProperties {
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarbonPage {
    #[serde(default)]
    value: Vec<CarbonEntry>,
    #[serde(default)]
    skip_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarbonEntry {
    #[serde(default)]
    data_type: String,
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    latest_month_emissions: Option<f64>,
    #[serde(default)]
    previous_month_emissions: Option<f64>,
    #[serde(default)]
    monthly_emissions_change_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PricingEntry {
    name: String,
    #[serde(default)]
    properties: PricingProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingProperties {
    #[serde(default)]
    pricing_tier: String,
    #[serde(default)]
    deprecated: Option<bool>,
}

/// ManagementClient adapter for resource manager REST endpoints
///
/// Covers subscription listing, diagnostic settings, cost management,
/// carbon optimization and Defender pricings. Every call goes through the
/// shared [`RetryPolicy`] and honours the caller's cancellation token.
pub struct ManagementClient {
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl ManagementClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self, CloudApiError> {
        Ok(Self {
            client: http::build_client(Duration::from_secs(60))?,
            tokens,
            retry: RetryPolicy::default(),
        })
    }

    async fn token(&self) -> Result<String, CloudApiError> {
        self.tokens
            .access_token()
            .await
            .map_err(|e| CloudApiError::Unauthenticated(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<T, CloudApiError> {
        let token = self.token().await?;
        let (_, body) = self
            .retry
            .run(cancel, || {
                http::execute(self.client.get(url).bearer_auth(&token), cancel)
            })
            .await?;
        serde_json::from_str(&body).map_err(|e| CloudApiError::Decode(e.to_string()))
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<T, CloudApiError> {
        let token = self.token().await?;
        let (_, body) = self
            .retry
            .run(cancel, || {
                http::execute(
                    self.client.post(url).bearer_auth(&token).json(payload),
                    cancel,
                )
            })
            .await?;
        serde_json::from_str(&body).map_err(|e| CloudApiError::Decode(e.to_string()))
    }

    /// Follows `nextLink` until the listing is exhausted
    async fn get_all<T: DeserializeOwned>(
        &self,
        first_url: String,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, CloudApiError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let page: Paged<T> = self.get(&url, cancel).await?;
            items.extend(page.value);
            next = page.next_link.filter(|l| !l.is_empty());
        }
        Ok(items)
    }
}

fn cost_query_payload(from: NaiveDate, to: NaiveDate) -> Value {
    json!({
        "type": "ActualCost",
        "timeframe": "Custom",
        "timePeriod": {
            "from": format!("{}T00:00:00Z", from),
            "to": format!("{}T23:59:59Z", to),
        },
        "dataset": {
            "granularity": "None",
            "aggregation": {
                "totalCost": {"name": "PreTaxCost", "function": "Sum"}
            },
            "grouping": [{"type": "Dimension", "name": "ServiceName"}]
        }
    })
}

fn carbon_query_payload(
    subscriptions: &[String],
    from: NaiveDate,
    to: NaiveDate,
    skip_token: Option<&str>,
) -> Value {
    let mut payload = json!({
        "reportType": "ItemDetailsReport",
        "subscriptionList": subscriptions,
        "carbonScopeList": ["Scope1", "Scope2", "Scope3"],
        "dateRange": {"start": from.to_string(), "end": to.to_string()},
        "categoryType": "ResourceType",
        "orderBy": "LatestMonthEmissions",
        "sortDirection": "Desc",
        "pageSize": 1000,
    });
    if let Some(token) = skip_token {
        payload["skipToken"] = Value::String(token.to_string());
    }
    payload
}

/// Cost rows are positional: value, service name, currency
fn service_cost_from_row(row: &[Value]) -> Option<ServiceCost> {
    let value = row.first()?.as_f64()?;
    let service_name = row.get(1)?.as_str()?.to_string();
    let currency = row
        .get(2)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(ServiceCost {
        service_name,
        value,
        currency,
    })
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn list_subscriptions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubscriptionInfo>, CloudApiError> {
        let url = format!(
            "{}/subscriptions?api-version={}",
            MANAGEMENT_ENDPOINT, SUBSCRIPTIONS_API_VERSION
        );
        let entries: Vec<SubscriptionEntry> = self.get_all(url, cancel).await?;
        Ok(entries
            .into_iter()
            .map(|e| SubscriptionInfo {
                id: e.subscription_id,
                name: e.display_name,
                state: e.state,
            })
            .collect())
    }

    async fn diagnostic_settings_count(
        &self,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, CloudApiError> {
        let url = format!(
            "{}{}/providers/Microsoft.Insights/diagnosticSettings?api-version={}",
            MANAGEMENT_ENDPOINT,
            http::encode_resource_path(resource_id),
            DIAGNOSTICS_API_VERSION
        );
        let settings: Vec<Value> = self.get_all(url, cancel).await?;
        Ok(settings.len())
    }

    async fn query_costs(
        &self,
        subscription_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<ServiceCost>, CloudApiError> {
        let url = format!(
            "{}/subscriptions/{}/providers/Microsoft.CostManagement/query?api-version={}",
            MANAGEMENT_ENDPOINT,
            urlencoding::encode(subscription_id),
            COST_API_VERSION
        );
        let response: CostQueryResponse = self
            .post(&url, &cost_query_payload(from, to), cancel)
            .await?;
        Ok(response
            .properties
            .rows
            .iter()
            .filter_map(|row| service_cost_from_row(row))
            .collect())
    }

    async fn query_carbon_emissions(
        &self,
        subscriptions: &[String],
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<CarbonEmissionItem>, CloudApiError> {
        let url = format!(
            "{}/providers/Microsoft.Carbon/carbonEmissionReports?api-version={}",
            MANAGEMENT_ENDPOINT, CARBON_API_VERSION
        );
        let mut items = Vec::new();
        let mut skip_token: Option<String> = None;
        loop {
            let payload = carbon_query_payload(subscriptions, from, to, skip_token.as_deref());
            let page: CarbonPage = self.post(&url, &payload, cancel).await?;
            items.extend(page.value.into_iter().filter_map(|entry| {
                if entry.data_type != "ItemDetailsData" {
                    return None;
                }
                Some(CarbonEmissionItem {
                    resource_type: entry.item_name?,
                    latest_month: entry.latest_month_emissions?,
                    previous_month: entry.previous_month_emissions,
                    monthly_change_value: entry.monthly_emissions_change_value,
                })
            }));
            skip_token = page.skip_token.filter(|t| !t.is_empty());
            if skip_token.is_none() {
                return Ok(items);
            }
        }
    }

    async fn list_defender_pricings(
        &self,
        subscription_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DefenderPricing>, CloudApiError> {
        let url = format!(
            "{}/subscriptions/{}/providers/Microsoft.Security/pricings?api-version={}",
            MANAGEMENT_ENDPOINT,
            urlencoding::encode(subscription_id),
            PRICINGS_API_VERSION
        );
        let page: Paged<PricingEntry> = self.get(&url, cancel).await?;
        Ok(page
            .value
            .into_iter()
            .map(|p| DefenderPricing {
                name: p.name,
                tier: p.properties.pricing_tier,
                deprecated: p.properties.deprecated.unwrap_or(false),
            })
            .collect())
    }
}
