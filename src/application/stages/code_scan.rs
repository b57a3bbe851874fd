use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::ResourceInstance;
use crate::audit::services::RuleEngine;
use crate::ports::outbound::{CloudApiError, GraphRow};
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Listings buffered between fetch tasks and the collector
const LISTING_CHANNEL_CAPACITY: usize = 4;

struct Listing {
    scanner: &'static str,
    resource_type: &'static str,
    rows: std::result::Result<Vec<GraphRow>, CloudApiError>,
}

/// Runs the selected scanners' code rules over their resource types
///
/// One task per scanner and type lists the resources; a single collector
/// hydrates each row and evaluates the rules against the preflight indexes.
pub struct CodeScan;

#[async_trait]
impl StageAction for CodeScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = Arc::new(ctx.subscription_ids());
        if subscriptions.is_empty() {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel::<Listing>(LISTING_CHANNEL_CAPACITY);
        let mut tasks = JoinSet::new();
        for scanner in ctx.services.scanners.iter() {
            for &resource_type in scanner.resource_types() {
                if ctx.filters.is_resource_type_excluded(resource_type) {
                    continue;
                }
                let query = scanner.listing_query(resource_type);
                let scanner = scanner.abbreviation();
                let services = Arc::clone(&ctx.services);
                let subscriptions = Arc::clone(&subscriptions);
                let cancel = ctx.cancel.clone();
                let tx = tx.clone();
                tasks.spawn(async move {
                    debug!(scanner, query = %query, "listing resources for code rules");
                    let rows = services.graph_rows(&query, &subscriptions, &cancel).await;
                    let _ = tx
                        .send(Listing {
                            scanner,
                            resource_type,
                            rows,
                        })
                        .await;
                });
            }
        }
        drop(tx);

        let mut scanned = 0usize;
        let mut emitted = 0usize;
        loop {
            let listing = tokio::select! {
                _ = ctx.cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(CloudApiError::Cancelled.into());
                }
                listing = rx.recv() => listing,
            };
            let Some(listing) = listing else {
                break;
            };

            let rows = match listing.rows {
                Ok(rows) => rows,
                Err(CloudApiError::Cancelled) => return Err(CloudApiError::Cancelled.into()),
                Err(e) => {
                    warn!(scanner = listing.scanner, resource_type = listing.resource_type, error = %e, "resource listing failed, skipping type");
                    continue;
                }
            };

            let rules = ctx.services.catalog.code_rules_for_type(listing.resource_type);
            for row in &rows {
                let Some(instance) = ResourceInstance::from_graph_row(row) else {
                    warn!(scanner = listing.scanner, "resource row without id, skipping");
                    continue;
                };
                if ctx
                    .filters
                    .is_typed_resource_excluded(instance.id(), &instance.resource.resource_type)
                {
                    continue;
                }
                scanned += 1;
                let subscription_name = ctx.subscription_name(&instance.resource.subscription_id);
                let results = RuleEngine::scan_resource(
                    &rules,
                    &instance,
                    &ctx.indexes,
                    &ctx.filters,
                    subscription_name,
                );
                emitted += results.len();
                ctx.report.results.extend(results);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "listing task terminated abnormally");
            }
        }
        info!(resources = scanned, results = emitted, "code scan finished");
        Ok(())
    }
}
