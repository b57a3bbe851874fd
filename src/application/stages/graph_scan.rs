use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::application::worker_pool::{DispatchScope, WorkerPool, DEFAULT_WORKERS};
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dispatches every eligible catalog graph rule through the worker pool
pub struct GraphScan {
    workers: usize,
}

impl Default for GraphScan {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

#[async_trait]
impl StageAction for GraphScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        let rules = ctx.services.catalog.dispatchable_graph_rules(&ctx.filters);
        let total = rules.len();
        let scope = Arc::new(DispatchScope {
            subscriptions,
            subscription_names: ctx.subscription_names().clone(),
        });
        let pool = WorkerPool::new(
            Arc::clone(&ctx.services.graph),
            Arc::clone(&ctx.services.limiter),
        )
        .with_workers(self.workers);

        ctx.services
            .progress
            .report(&format!("Running {} graph rules", total));
        let batches = pool.dispatch(rules, scope, &ctx.cancel).await?;

        let mut failed = 0usize;
        for (done, batch) in batches.into_iter().enumerate() {
            ctx.services.progress.report_progress(done + 1, total, None);
            if batch.error.is_some() {
                failed += 1;
                continue;
            }
            let before = ctx.report.results.len();
            ctx.report.results.extend(
                batch
                    .results
                    .into_iter()
                    .filter(|r| !ctx.filters.is_resource_excluded(&r.resource_id)),
            );
            let dropped = batch
                .rows_returned
                .saturating_sub(ctx.report.results.len() - before);
            if dropped > 0 {
                debug!(rule = %batch.recommendation_id, dropped, "rows filtered or skipped");
            }
        }

        if failed > 0 {
            warn!(failed, total, "some graph rules returned no results due to errors");
        }
        info!(rules = total, failed, "graph scan finished");
        Ok(())
    }
}
