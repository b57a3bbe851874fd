use super::names::ADVISOR_SCAN;
use super::tolerate_capability;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::audit::domain::AdvisorRecord;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

const ADVISOR_QUERY: &str = "advisorresources \
| where type == 'microsoft.advisor/recommendations' \
| project subscriptionId, \
resourceId = tostring(properties.resourceMetadata.resourceId), \
impactedField = tostring(properties.impactedField), \
impactedValue = tostring(properties.impactedValue), \
category = tostring(properties.category), \
impact = tostring(properties.impact), \
problem = tostring(properties.shortDescription.problem), \
recommendationTypeId = tostring(properties.recommendationTypeId)";

/// Advisor recommendations, one row per (resource, recommendation, category)
pub struct AdvisorScan;

#[async_trait]
impl StageAction for AdvisorScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        debug!(query = ADVISOR_QUERY, "querying advisor");
        let rows = tolerate_capability(
            ADVISOR_SCAN,
            ctx.services
                .graph_rows(ADVISOR_QUERY, &subscriptions, &ctx.cancel)
                .await,
        )
        .context("Failed to query advisor recommendations")?;

        let mut seen = HashSet::new();
        for row in &rows {
            let subscription_id = string_field(row, "subscriptionId");
            let resource_id = string_field(row, "resourceId");
            if ctx.filters.is_subscription_excluded(&subscription_id)
                || ctx.filters.is_service_excluded(&resource_id)
            {
                continue;
            }
            let record = AdvisorRecord {
                subscription_name: ctx.subscription_name(&subscription_id).to_string(),
                subscription_id,
                name: string_field(row, "impactedValue"),
                resource_type: string_field(row, "impactedField"),
                category: string_field(row, "category"),
                impact: string_field(row, "impact"),
                description: string_field(row, "problem"),
                recommendation_id: string_field(row, "recommendationTypeId"),
                resource_id,
            };
            let key = (
                record.resource_id.to_lowercase(),
                record.recommendation_id.clone(),
                record.category.clone(),
            );
            if seen.insert(key) {
                ctx.report.advisor.push(record);
            }
        }
        Ok(())
    }
}
