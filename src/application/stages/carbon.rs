use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::CarbonEmission;
use crate::ports::outbound::CloudApiError;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;
use tracing::info;

/// Subscriptions per carbon report request
pub const CARBON_BATCH_SIZE: usize = 100;
pub const CARBON_UNIT: &str = "kgCO2e";

/// The previous full month, as the single-month range the report API takes
pub fn carbon_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let previous = first_of_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_of_month);
    (previous, previous)
}

#[derive(Default)]
struct Totals {
    latest_month: f64,
    previous_month: f64,
    monthly_change_value: f64,
}

/// Emissions per resource type across all active subscriptions
pub struct CarbonScan;

#[async_trait]
impl StageAction for CarbonScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }
        let (from, to) = carbon_window(ctx.started_at.date_naive());

        let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
        for (batch_index, batch) in subscriptions.chunks(CARBON_BATCH_SIZE).enumerate() {
            let items = match ctx
                .services
                .management
                .query_carbon_emissions(batch, from, to, &ctx.cancel)
                .await
            {
                Ok(items) => items,
                Err(CloudApiError::Cancelled) => return Err(CloudApiError::Cancelled.into()),
                Err(e) => {
                    info!(batch = batch_index, error = %e, "carbon emissions not available for batch");
                    continue;
                }
            };
            for item in items {
                let resource_type = item.resource_type.to_lowercase();
                if ctx.filters.is_resource_type_excluded(&resource_type) {
                    continue;
                }
                let entry = totals.entry(resource_type).or_default();
                entry.latest_month += item.latest_month;
                entry.previous_month += item.previous_month.unwrap_or_default();
                entry.monthly_change_value += item.monthly_change_value.unwrap_or_default();
            }
        }

        ctx.report
            .carbon
            .extend(totals.into_iter().map(|(resource_type, t)| CarbonEmission {
                from,
                to,
                resource_type,
                latest_month: t.latest_month,
                previous_month: t.previous_month,
                monthly_change_value: t.monthly_change_value,
                unit: CARBON_UNIT.to_string(),
            }));
        Ok(())
    }
}
