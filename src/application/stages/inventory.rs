use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::Resource;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info, warn};

const INVENTORY_QUERY: &str = "resources \
| project id, subscriptionId, resourceGroup, location, type, name, \
skuName = tostring(sku.name), skuTier = tostring(sku.tier), kind \
| order by subscriptionId, id";

/// Lists every resource and splits it into inventory and out-of-scope
pub struct ResourceInventory;

#[async_trait]
impl StageAction for ResourceInventory {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        debug!(query = INVENTORY_QUERY, "listing resources");
        let rows = ctx
            .services
            .graph_rows(INVENTORY_QUERY, &subscriptions, &ctx.cancel)
            .await
            .context("Failed to list resources")?;

        for row in &rows {
            let Some(resource) = Resource::from_graph_row(row) else {
                warn!("inventory row without id, skipping");
                continue;
            };
            if ctx
                .filters
                .is_typed_resource_excluded(&resource.id, &resource.resource_type)
            {
                ctx.report.out_of_scope.push(resource);
            } else {
                ctx.report.resources.push(resource);
            }
        }

        info!(
            in_scope = ctx.report.resources.len(),
            out_of_scope = ctx.report.out_of_scope.len(),
            "resource inventory collected"
        );
        Ok(())
    }
}
