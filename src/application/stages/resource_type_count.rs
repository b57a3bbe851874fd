use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::audit::domain::ResourceTypeCount as TypeCountRow;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

const TYPE_COUNT_QUERY: &str =
    "resources | summarize count() by subscriptionId, type | order by subscriptionId, type";

/// Per-subscription resource counts joined with catalog coverage
pub struct ResourceTypeCount;

#[async_trait]
impl StageAction for ResourceTypeCount {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        debug!(query = TYPE_COUNT_QUERY, "counting resources by type");
        let rows = ctx
            .services
            .graph_rows(TYPE_COUNT_QUERY, &subscriptions, &ctx.cancel)
            .await
            .context("Failed to count resources by type")?;

        for row in &rows {
            let resource_type = string_field(row, "type").to_lowercase();
            if resource_type.is_empty() || ctx.filters.is_resource_type_excluded(&resource_type) {
                continue;
            }
            let subscription_id = string_field(row, "subscriptionId");
            let count = match row.get("count_") {
                Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
                Some(Value::String(s)) => s.parse().unwrap_or_default(),
                _ => 0,
            };
            let counted = TypeCountRow {
                subscription_name: ctx.subscription_name(&subscription_id).to_string(),
                covered_by_catalog: ctx.services.catalog.covers_type(&resource_type),
                subscription_id,
                resource_type,
                count,
            };
            ctx.report.resource_type_counts.push(counted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::catalog::EmbeddedCatalog;
    use crate::application::test_support::{context_for, services, StubGraph, StubManagement};
    use crate::audit::domain::Filters;
    use crate::audit::services::Catalog;
    use crate::ports::outbound::CatalogSource;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_counts_carry_coverage_and_skip_excluded_types() {
        let mut catalog = Catalog::new();
        let source = EmbeddedCatalog::Aprl;
        catalog.load_tree(&source.files().unwrap(), source.source());
        let graph = StubGraph::new().respond(
            "summarize",
            vec![
                json!({"subscriptionId": "S1", "type": "Microsoft.Storage/storageAccounts", "count_": 4}),
                json!({"subscriptionId": "S1", "type": "microsoft.web/sites", "count_": 2}),
                json!({"subscriptionId": "S1", "type": "microsoft.sql/servers", "count_": 1}),
            ],
        );
        let filters = Filters::new().include_resource_types([
            "microsoft.storage/storageaccounts",
            "microsoft.web/sites",
        ]);
        let mut ctx = context_for(
            services(Arc::new(graph), Arc::new(StubManagement::default()), catalog, Vec::new()),
            filters,
        );

        ResourceTypeCount.run(&mut ctx).await.unwrap();

        let rows = &ctx.report.resource_type_counts;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].resource_type, "microsoft.storage/storageaccounts");
        assert_eq!(rows[0].count, 4);
        assert!(rows[0].covered_by_catalog);
        assert_eq!(rows[0].subscription_name, "Production");
        assert!(!rows[1].covered_by_catalog);
    }
}
