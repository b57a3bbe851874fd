use super::http::{self, MANAGEMENT_ENDPOINT};
use super::retry::RetryPolicy;
use crate::ports::outbound::{CloudApiError, GraphQuery, GraphRow, TokenProvider};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const API_VERSION: &str = "2021-03-01";
/// Provider limit on subscriptions per request
const SUBSCRIPTION_BATCH: usize = 300;
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    subscriptions: Option<&'a [String]>,
    #[serde(rename = "managementGroups", skip_serializing_if = "Option::is_none")]
    management_groups: Option<&'a [String]>,
    query: &'a str,
    options: QueryOptions,
}

#[derive(Debug, Serialize)]
struct QueryOptions {
    #[serde(rename = "$top")]
    top: u32,
    #[serde(rename = "$skipToken", skip_serializing_if = "Option::is_none")]
    skip_token: Option<String>,
    #[serde(rename = "resultFormat")]
    result_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<GraphRow>,
    #[serde(rename = "$skipToken", default)]
    skip_token: Option<String>,
}

#[derive(Clone, Copy)]
enum Scope<'a> {
    Subscriptions(&'a [String]),
    ManagementGroups(&'a [String]),
}

/// ResourceGraphClient adapter for the fleet-wide query endpoint
///
/// Splits the subscription set into provider-sized batches, follows
/// `$skipToken` continuation until exhaustion and retries transient
/// failures per [`RetryPolicy`]. When the provider reports an exhausted
/// user quota the client waits for the advertised reset before the next page.
pub struct ResourceGraphClient {
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    endpoint: String,
    retry: RetryPolicy,
}

impl ResourceGraphClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self, CloudApiError> {
        Ok(Self {
            client: http::build_client(Duration::from_secs(120))?,
            tokens,
            endpoint: format!(
                "{}/providers/Microsoft.ResourceGraph/resources?api-version={}",
                MANAGEMENT_ENDPOINT, API_VERSION
            ),
            retry: RetryPolicy::default(),
        })
    }

    async fn run_scoped(
        &self,
        query: &str,
        scope: Scope<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        debug!(query = %query, "resource graph query");
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| CloudApiError::Unauthenticated(e.to_string()))?;

        let mut rows = Vec::new();
        let mut skip_token: Option<String> = None;
        loop {
            let request = QueryRequest {
                subscriptions: match scope {
                    Scope::Subscriptions(s) => Some(s),
                    Scope::ManagementGroups(_) => None,
                },
                management_groups: match scope {
                    Scope::ManagementGroups(m) => Some(m),
                    Scope::Subscriptions(_) => None,
                },
                query,
                options: QueryOptions {
                    top: PAGE_SIZE,
                    skip_token: skip_token.clone(),
                    result_format: "objectArray",
                },
            };

            let (headers, body) = self
                .retry
                .run(cancel, || {
                    http::execute(
                        self.client
                            .post(&self.endpoint)
                            .bearer_auth(&token)
                            .json(&request),
                        cancel,
                    )
                })
                .await?;

            let page: QueryResponse =
                serde_json::from_str(&body).map_err(|e| CloudApiError::Decode(e.to_string()))?;
            rows.extend(page.data);

            skip_token = page.skip_token.filter(|t| !t.is_empty());
            if skip_token.is_none() {
                return Ok(rows);
            }
            wait_for_quota(&headers, cancel).await?;
        }
    }
}

/// Sleeps until the user quota resets when the last response says it is spent
async fn wait_for_quota(headers: &HeaderMap, cancel: &CancellationToken) -> Result<(), CloudApiError> {
    let Some(delay) = quota_reset_delay(headers) else {
        return Ok(());
    };
    info!(wait_secs = delay.as_secs(), "resource graph quota exhausted, waiting for reset");
    tokio::select! {
        _ = cancel.cancelled() => Err(CloudApiError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

fn quota_reset_delay(headers: &HeaderMap) -> Option<Duration> {
    let remaining = headers
        .get("x-ms-user-quota-remaining")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    if remaining > 0 {
        return None;
    }
    headers
        .get("x-ms-user-quota-resets-after")
        .and_then(|v| v.to_str().ok())
        .and_then(http::parse_hms)
}

#[async_trait]
impl GraphQuery for ResourceGraphClient {
    async fn query(
        &self,
        query: &str,
        subscriptions: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        let mut rows = Vec::new();
        for batch in subscriptions.chunks(SUBSCRIPTION_BATCH) {
            rows.extend(
                self.run_scoped(query, Scope::Subscriptions(batch), cancel)
                    .await?,
            );
        }
        Ok(rows)
    }

    async fn query_management_groups(
        &self,
        query: &str,
        management_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.run_scoped(query, Scope::ManagementGroups(management_groups), cancel)
            .await
    }
}
