use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::application::worker_pool::{DispatchScope, WorkerPool};
use crate::audit::domain::{PluginOutput, RecommendationResult};
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Column headers of every plugin table
pub const PLUGIN_TABLE_HEADERS: [&str; 13] = [
    "Subscription Id",
    "Subscription Name",
    "Resource Group",
    "Resource Type",
    "Resource Name",
    "Recommendation Id",
    "Recommendation",
    "Impact",
    "Param1",
    "Param2",
    "Param3",
    "Param4",
    "Param5",
];

fn table_row(result: &RecommendationResult) -> Vec<String> {
    let mut row = vec![
        result.subscription_id.clone(),
        result.subscription_name.clone(),
        result.resource_group.clone(),
        result.resource_type.clone(),
        result.resource_name.clone(),
        result.recommendation_id.clone(),
        result.text.clone(),
        result.impact.to_string(),
    ];
    row.extend(result.params.iter().cloned());
    row
}

/// Runs each enabled plugin's queries and records one table per plugin
///
/// Plugin findings also join the recommendation results, where the
/// catalog wins any duplicate.
pub struct PluginScan;

#[async_trait]
impl StageAction for PluginScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() || ctx.services.plugins.is_empty() {
            return Ok(());
        }

        let scope = Arc::new(DispatchScope {
            subscriptions,
            subscription_names: ctx.subscription_names().clone(),
        });
        let pool = WorkerPool::new(
            Arc::clone(&ctx.services.graph),
            Arc::clone(&ctx.services.limiter),
        );
        let services = Arc::clone(&ctx.services);

        for plugin in &services.plugins {
            let rules: Vec<_> = plugin
                .recommendations
                .iter()
                .filter(|r| r.is_dispatchable_graph_rule())
                .filter(|r| !ctx.filters.is_recommendation_excluded(&r.id))
                .filter(|r| !ctx.filters.is_resource_type_excluded(&r.resource_type))
                .cloned()
                .collect();
            let position: HashMap<String, usize> = rules
                .iter()
                .enumerate()
                .map(|(i, r)| (r.id.clone(), i))
                .collect();

            info!(plugin = %plugin.name, version = %plugin.version, queries = rules.len(), "running plugin");
            let mut batches = pool.dispatch(rules, Arc::clone(&scope), &ctx.cancel).await?;
            batches.sort_by_key(|b| position.get(&b.recommendation_id).copied().unwrap_or(usize::MAX));

            let mut output = PluginOutput {
                plugin_name: plugin.name.clone(),
                description: plugin.description.clone(),
                headers: PLUGIN_TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            };
            for batch in batches {
                if let Some(error) = &batch.error {
                    warn!(plugin = %plugin.name, query = %batch.recommendation_id, error = %error, "plugin query failed");
                    continue;
                }
                for result in batch.results {
                    if ctx.filters.is_resource_excluded(&result.resource_id) {
                        continue;
                    }
                    output.rows.push(table_row(&result));
                    ctx.report.results.push(result);
                }
            }
            ctx.report.plugin_outputs.push(output);
        }
        Ok(())
    }
}
