use super::names::COST_SCAN;
use super::tolerate_capability;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::{CostItem, CostReport};
use crate::ports::outbound::CloudApiError;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use tracing::{info, warn};

/// First day of the month three months before `today`, through `today`
pub fn cost_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let from = first_of_month
        .checked_sub_months(Months::new(3))
        .unwrap_or(first_of_month);
    (from, today)
}

/// Actual cost per service for every active subscription
pub struct CostScan;

#[async_trait]
impl StageAction for CostScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let (from, to) = cost_window(ctx.started_at.date_naive());
        let subscriptions: Vec<(String, String)> = ctx
            .subscriptions()
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect();

        let mut items = Vec::new();
        for (subscription_id, subscription_name) in subscriptions {
            let costs = ctx
                .services
                .management
                .query_costs(&subscription_id, from, to, &ctx.cancel)
                .await;
            let costs = match tolerate_capability(COST_SCAN, costs) {
                Ok(costs) => costs,
                Err(CloudApiError::Cancelled) => return Err(CloudApiError::Cancelled.into()),
                Err(e) => {
                    warn!(subscription = %subscription_id, error = %e, "cost query failed, skipping subscription");
                    continue;
                }
            };
            items.extend(costs.into_iter().map(|cost| CostItem {
                subscription_id: subscription_id.clone(),
                subscription_name: subscription_name.clone(),
                service_name: cost.service_name,
                value: cost.value.to_string(),
                currency: cost.currency,
            }));
        }

        info!(%from, %to, items = items.len(), "costs collected");
        ctx.report.costs = Some(CostReport { from, to, items });
        Ok(())
    }
}
