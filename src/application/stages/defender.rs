use super::names::DEFENDER_SCAN;
use super::tolerate_capability;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::audit::domain::{DefenderPlan, DefenderRecommendation};
use crate::ports::outbound::CloudApiError;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

const ASSESSMENTS_QUERY: &str = "securityresources \
| where type == 'microsoft.security/assessments' \
| where properties.status.code == 'Unhealthy' \
| mv-expand category = properties.metadata.categories \
| extend resourceId = tostring(properties.resourceDetails.Id), \
segments = split(tostring(properties.resourceDetails.Id), '/') \
| project subscriptionId, \
resourceGroup = tostring(segments[4]), \
resourceType = tostring(segments[6]), \
resourceName = tostring(segments[8]), \
category = tostring(category), \
severity = tostring(properties.metadata.severity), \
recommendationName = tostring(properties.displayName), \
actionDescription = tostring(properties.metadata.description), \
remediationDescription = tostring(properties.metadata.remediationDescription), \
portalLink = tostring(properties.links.azurePortal), \
resourceId";

/// Defender plan tiers per subscription plus unhealthy assessments
pub struct DefenderScan;

impl DefenderScan {
    async fn collect_plans(ctx: &mut ScanContext) -> Result<()> {
        let subscriptions: Vec<(String, String)> = ctx
            .subscriptions()
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect();

        for (subscription_id, subscription_name) in subscriptions {
            let pricings = ctx
                .services
                .management
                .list_defender_pricings(&subscription_id, &ctx.cancel)
                .await;
            let pricings = match tolerate_capability(DEFENDER_SCAN, pricings) {
                Ok(pricings) => pricings,
                Err(CloudApiError::Cancelled) => return Err(CloudApiError::Cancelled.into()),
                Err(e) => {
                    warn!(subscription = %subscription_id, error = %e, "defender plans unavailable, skipping subscription");
                    continue;
                }
            };
            ctx.report
                .defender
                .extend(pricings.into_iter().map(|pricing| DefenderPlan {
                    subscription_id: subscription_id.clone(),
                    subscription_name: subscription_name.clone(),
                    name: pricing.name,
                    tier: pricing.tier,
                    deprecated: pricing.deprecated,
                }));
        }
        Ok(())
    }

    async fn collect_assessments(ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        debug!(query = ASSESSMENTS_QUERY, "querying defender assessments");
        let rows = tolerate_capability(
            DEFENDER_SCAN,
            ctx.services
                .graph_rows(ASSESSMENTS_QUERY, &subscriptions, &ctx.cancel)
                .await,
        )
        .context("Failed to query defender assessments")?;

        for row in &rows {
            let resource_id = string_field(row, "resourceId");
            if ctx.filters.is_service_excluded(&resource_id) {
                continue;
            }
            let subscription_id = string_field(row, "subscriptionId");
            let portal_link = string_field(row, "portalLink");
            let recommendation = DefenderRecommendation {
                subscription_name: ctx.subscription_name(&subscription_id).to_string(),
                subscription_id,
                resource_group: string_field(row, "resourceGroup"),
                resource_type: string_field(row, "resourceType"),
                resource_name: string_field(row, "resourceName"),
                category: string_field(row, "category"),
                severity: string_field(row, "severity"),
                recommendation_name: string_field(row, "recommendationName"),
                action_description: string_field(row, "actionDescription"),
                remediation_description: string_field(row, "remediationDescription"),
                portal_link: if portal_link.is_empty() || portal_link.starts_with("https://") {
                    portal_link
                } else {
                    format!("https://{}", portal_link)
                },
                resource_id,
            };
            ctx.report.defender_recommendations.push(recommendation);
        }
        Ok(())
    }
}

#[async_trait]
impl StageAction for DefenderScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        if ctx.subscriptions().is_empty() {
            return Ok(());
        }
        Self::collect_plans(ctx).await?;
        Self::collect_assessments(ctx).await
    }
}
