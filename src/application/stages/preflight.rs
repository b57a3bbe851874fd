use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::{string_field, value_to_string};
use crate::ports::outbound::CloudApiError;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

const PRIVATE_ENDPOINTS_QUERY: &str = "resources \
| where type =~ 'microsoft.network/privateendpoints' \
| mv-expand connection = array_concat(properties.privateLinkServiceConnections, properties.manualPrivateLinkServiceConnections) \
| project backendId = tolower(tostring(connection.properties.privateLinkServiceId)) \
| where isnotempty(backendId)";

const PUBLIC_IPS_QUERY: &str = "resources \
| where type =~ 'microsoft.network/publicipaddresses' \
| project id, zones";

/// Types whose diagnostic settings are worth looking up
const DIAGNOSTICS_TYPES: &[&str] = &[
    "microsoft.apimanagement/service",
    "microsoft.app/containerapps",
    "microsoft.cache/redis",
    "microsoft.compute/virtualmachines",
    "microsoft.compute/virtualmachinescalesets",
    "microsoft.containerregistry/registries",
    "microsoft.containerservice/managedclusters",
    "microsoft.documentdb/databaseaccounts",
    "microsoft.eventhub/namespaces",
    "microsoft.keyvault/vaults",
    "microsoft.network/applicationgateways",
    "microsoft.network/azurefirewalls",
    "microsoft.network/loadbalancers",
    "microsoft.network/networksecuritygroups",
    "microsoft.network/publicipaddresses",
    "microsoft.network/virtualnetworks",
    "microsoft.servicebus/namespaces",
    "microsoft.sql/servers",
    "microsoft.sql/servers/databases",
    "microsoft.storage/storageaccounts",
    "microsoft.web/serverfarms",
    "microsoft.web/sites",
];

/// Diagnostics lookups in flight at once
pub const DIAGNOSTICS_CONCURRENCY: usize = 20;

/// Builds the auxiliary indexes read by code rules
pub struct Preflight {
    concurrency: usize,
}

impl Default for Preflight {
    fn default() -> Self {
        Self {
            concurrency: DIAGNOSTICS_CONCURRENCY,
        }
    }
}

impl Preflight {
    async fn index_private_endpoints(ctx: &mut ScanContext, subscriptions: &[String]) -> Result<()> {
        debug!(query = PRIVATE_ENDPOINTS_QUERY, "indexing private endpoints");
        let rows = ctx
            .services
            .graph_rows(PRIVATE_ENDPOINTS_QUERY, subscriptions, &ctx.cancel)
            .await
            .context("Failed to list private endpoints")?;
        for row in &rows {
            let backend = string_field(row, "backendId");
            if !backend.is_empty() {
                ctx.indexes.record_private_endpoint(&backend);
            }
        }
        Ok(())
    }

    async fn index_public_ips(ctx: &mut ScanContext, subscriptions: &[String]) -> Result<()> {
        debug!(query = PUBLIC_IPS_QUERY, "indexing public IP addresses");
        let rows = ctx
            .services
            .graph_rows(PUBLIC_IPS_QUERY, subscriptions, &ctx.cancel)
            .await
            .context("Failed to list public IP addresses")?;
        for row in &rows {
            let id = string_field(row, "id");
            if id.is_empty() {
                continue;
            }
            let zones = match row.get("zones") {
                Some(Value::Array(zones)) => zones.iter().map(value_to_string).collect(),
                _ => Vec::new(),
            };
            ctx.indexes.record_public_ip(&id, zones);
        }
        Ok(())
    }

    async fn index_diagnostics(&self, ctx: &mut ScanContext) -> Result<()> {
        use futures::stream::{self, StreamExt};

        let candidates: Vec<String> = ctx
            .report
            .resources
            .iter()
            .filter(|r| DIAGNOSTICS_TYPES.contains(&r.resource_type.as_str()))
            .map(|r| r.id.clone())
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let management = &ctx.services.management;
        let cancel = &ctx.cancel;
        let lookups: Vec<(String, std::result::Result<usize, CloudApiError>)> =
            stream::iter(candidates)
                .map(|id| async move {
                    let count = management.diagnostic_settings_count(&id, cancel).await;
                    (id, count)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        for (id, count) in lookups {
            match count {
                Ok(0) => {}
                Ok(_) => ctx.indexes.record_diagnostics(&id),
                Err(CloudApiError::Cancelled) => return Err(CloudApiError::Cancelled.into()),
                Err(e) => warn!(resource = %id, error = %e, "diagnostic settings lookup failed"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StageAction for Preflight {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        Self::index_private_endpoints(ctx, &subscriptions).await?;
        Self::index_public_ips(ctx, &subscriptions).await?;
        self.index_diagnostics(ctx).await?;

        info!(
            private_endpoints = ctx.indexes.private_endpoint_count(),
            public_ips = ctx.indexes.public_ip_count(),
            diagnostics = ctx.indexes.diagnostics_count(),
            "preflight indexes built"
        );
        Ok(())
    }
}
