use super::names::POLICY_SCAN;
use super::tolerate_capability;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::audit::domain::resource_id::{
    resource_group_from_resource_id, resource_name_from_resource_id,
    resource_type_from_resource_id,
};
use crate::audit::domain::PolicyRecord;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

const POLICY_QUERY: &str = "policyresources \
| where type == 'microsoft.policyinsights/policystates' \
| extend resourceId = tostring(properties.resourceId), \
subscriptionId = tostring(properties.subscriptionId), \
policyAssignmentId = tostring(properties.policyAssignmentId), \
policyAssignmentName = tostring(properties.policyAssignmentName), \
policyDefinitionId = tolower(tostring(properties.policyDefinitionId)), \
policyDefinitionName = tostring(properties.policyDefinitionName), \
timestamp = tostring(properties.timestamp), \
complianceState = tostring(properties.complianceState) \
| where complianceState == 'NonCompliant' \
| join kind=leftouter ( \
policyresources \
| where type == 'microsoft.authorization/policydefinitions' \
| project policyDefinitionId = tolower(id), \
policyDescription = tostring(properties.description), \
policyDisplayName = tostring(properties.displayName) \
) on policyDefinitionId \
| project subscriptionId, resourceId, policyAssignmentId, policyAssignmentName, \
policyDefinitionId, policyDefinitionName, timestamp, policyDisplayName, policyDescription, complianceState";

/// Non-compliant policy states, one row per (resource, policy definition)
pub struct PolicyScan;

#[async_trait]
impl StageAction for PolicyScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        debug!(query = POLICY_QUERY, "querying policy states");
        let rows = tolerate_capability(
            POLICY_SCAN,
            ctx.services
                .graph_rows(POLICY_QUERY, &subscriptions, &ctx.cancel)
                .await,
        )
        .context("Failed to query policy compliance")?;

        let mut seen = HashSet::new();
        for row in &rows {
            let subscription_id = string_field(row, "subscriptionId");
            let resource_id = string_field(row, "resourceId");
            if ctx.filters.is_subscription_excluded(&subscription_id)
                || ctx.filters.is_service_excluded(&resource_id)
            {
                continue;
            }
            let record = PolicyRecord {
                subscription_name: ctx.subscription_name(&subscription_id).to_string(),
                subscription_id,
                resource_type: resource_type_from_resource_id(&resource_id),
                resource_group: resource_group_from_resource_id(&resource_id),
                name: resource_name_from_resource_id(&resource_id),
                policy_display_name: string_field(row, "policyDisplayName"),
                policy_description: string_field(row, "policyDescription"),
                policy_definition_name: string_field(row, "policyDefinitionName"),
                policy_definition_id: string_field(row, "policyDefinitionId"),
                policy_assignment_name: string_field(row, "policyAssignmentName"),
                policy_assignment_id: string_field(row, "policyAssignmentId"),
                compliance_state: string_field(row, "complianceState"),
                timestamp: string_field(row, "timestamp"),
                resource_id,
            };
            let key = (
                record.resource_id.to_lowercase(),
                record.policy_definition_id.to_lowercase(),
            );
            if seen.insert(key) {
                ctx.report.policy.push(record);
            }
        }
        Ok(())
    }
}
