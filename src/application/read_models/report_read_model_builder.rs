//! Builder for constructing ReportReadModel from a finished scan context
//!
//! Merges graph, code, plugin, advisor and policy findings, resolves
//! duplicates through [`ResultPrecedence`], projects every stage output
//! into a table and applies subscription masking last.

use super::report_read_model::{ReportMetadataView, ReportReadModel, StageSummaryView};
use super::report_table::ReportTable;
use crate::application::scan_context::ScanContext;
use crate::application::stages::names;
use crate::audit::domain::resource_id::resource_group_from_resource_id;
use crate::audit::domain::{
    AdvisorRecord, Category, Impact, PolicyRecord, Recommendation, RecommendationResult,
    ReportData, Resource, RuleKind, Source,
};
use crate::audit::policies::ResultPrecedence;

const RECOMMENDATION_HEADERS: [&str; 14] = [
    "Source",
    "Category",
    "Impact",
    "Resource Type",
    "Recommendation",
    "Recommendation Id",
    "Subscription Id",
    "Subscription Name",
    "Resource Group",
    "Resource Name",
    "Id",
    "SLA",
    "Compliant",
    "Learn",
];

const IMPACTED_HEADERS: [&str; 18] = [
    "Validated Using",
    "Source",
    "Category",
    "Impact",
    "Resource Type",
    "Recommendation",
    "Recommendation Id",
    "Subscription Id",
    "Subscription Name",
    "Resource Group",
    "Name",
    "Id",
    "Param1",
    "Param2",
    "Param3",
    "Param4",
    "Param5",
    "Learn",
];

const RESOURCE_HEADERS: [&str; 9] = [
    "Subscription Id",
    "Resource Group",
    "Location",
    "Type",
    "Name",
    "SKU Name",
    "SKU Tier",
    "Kind",
    "Id",
];

/// Builder for constructing ReportReadModel from the scan context
pub struct ReportReadModelBuilder;

impl ReportReadModelBuilder {
    /// Builds the read model.
    ///
    /// # Arguments
    /// * `ctx` - Context of a completed pipeline run
    /// * `mask` - Hide all but the last four characters of subscription ids
    pub fn build(ctx: &ScanContext, mask: bool) -> ReportReadModel {
        let ran = |stage: &str| ctx.metrics.contains_key(stage);
        let report = &ctx.report;

        let findings = Self::merge_findings(report);

        let mut model = ReportReadModel {
            metadata: Self::build_metadata(ctx, mask),
            recommendations: Self::recommendations_table(&findings),
            impacted: Self::impacted_table(&findings),
            resource_types: Self::resource_types_table(report)
                .enabled(ran(names::RESOURCE_TYPE_COUNT)),
            inventory: Self::resources_table("inventory", "Inventory", &report.resources)
                .enabled(ran(names::RESOURCE_INVENTORY)),
            out_of_scope: Self::resources_table(
                "outOfScope",
                "Out of Scope",
                &report.out_of_scope,
            )
            .enabled(ran(names::RESOURCE_INVENTORY)),
            advisor: Self::advisor_table(report).enabled(ran(names::ADVISOR_SCAN)),
            azure_policy: Self::policy_table(report).enabled(ran(names::POLICY_SCAN)),
            arc_sql: Self::arc_sql_table(report).enabled(ran(names::ARC_SCAN)),
            defender: Self::defender_table(report).enabled(ran(names::DEFENDER_SCAN)),
            defender_recommendations: Self::defender_recommendations_table(report)
                .enabled(ran(names::DEFENDER_SCAN)),
            costs: Self::costs_table(report).enabled(ran(names::COST_SCAN)),
            carbon: Self::carbon_table(report).enabled(ran(names::CARBON_SCAN)),
            plugins: Self::plugin_tables(report),
        };

        if mask {
            model.recommendations.mask_subscriptions();
            model.impacted.mask_subscriptions();
            model.resource_types.mask_subscriptions();
            model.inventory.mask_subscriptions();
            model.out_of_scope.mask_subscriptions();
            model.advisor.mask_subscriptions();
            model.azure_policy.mask_subscriptions();
            model.arc_sql.mask_subscriptions();
            model.defender.mask_subscriptions();
            model.defender_recommendations.mask_subscriptions();
            model.costs.mask_subscriptions();
            model.carbon.mask_subscriptions();
            model.plugins.iter_mut().for_each(ReportTable::mask_subscriptions);
        }

        model
    }

    /// Rule results followed by advisor and policy findings, deduplicated
    /// on (resource id, recommendation id).
    pub fn merge_findings(report: &ReportData) -> Vec<RecommendationResult> {
        let advisor = report.advisor.iter().map(Self::advisor_finding);
        let policy = report.policy.iter().map(Self::policy_finding);
        ResultPrecedence::deduplicate(report.results.iter().cloned().chain(advisor).chain(policy))
    }

    fn advisor_finding(record: &AdvisorRecord) -> RecommendationResult {
        let recommendation = Recommendation::new(
            record.recommendation_id.clone(),
            &record.resource_type,
            Category::parse(&record.category).unwrap_or(Category::Governance),
            Impact::parse(&record.impact).unwrap_or(Impact::Medium),
            record.description.clone(),
            Source::Advisor,
            RuleKind::Manual,
        );
        let mut result = RecommendationResult::for_recommendation(&recommendation, &record.resource_id);
        result.resource_name = record.name.clone();
        result.resource_group = resource_group_from_resource_id(&record.resource_id);
        result.subscription_id = record.subscription_id.clone();
        result.subscription_name = record.subscription_name.clone();
        result
    }

    fn policy_finding(record: &PolicyRecord) -> RecommendationResult {
        let recommendation = Recommendation::new(
            record.policy_definition_name.clone(),
            &record.resource_type,
            Category::Governance,
            Impact::Medium,
            record.policy_display_name.clone(),
            Source::Policy,
            RuleKind::Manual,
        );
        let mut result = RecommendationResult::for_recommendation(&recommendation, &record.resource_id);
        result.resource_name = record.name.clone();
        result.resource_group = record.resource_group.clone();
        result.subscription_id = record.subscription_id.clone();
        result.subscription_name = record.subscription_name.clone();
        result.params[0] = record.compliance_state.clone();
        result
    }

    fn build_metadata(ctx: &ScanContext, mask: bool) -> ReportMetadataView {
        let mut stages: Vec<_> = ctx.metrics.iter().collect();
        stages.sort_by_key(|(_, m)| m.started_at);

        ReportMetadataView {
            scan_id: ctx.scan_id.to_string(),
            generated_at: ctx.started_at.to_rfc3339(),
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            masked: mask,
            subscriptions: ctx.subscriptions().len(),
            stages: stages
                .into_iter()
                .map(|(name, m)| StageSummaryView {
                    name: name.clone(),
                    elapsed_ms: m.elapsed.as_millis(),
                    records: m.records,
                })
                .collect(),
        }
    }

    fn recommendations_table(findings: &[RecommendationResult]) -> ReportTable {
        let rows = findings
            .iter()
            .map(|r| {
                vec![
                    r.source.to_string(),
                    r.category.to_string(),
                    r.impact.to_string(),
                    r.resource_type.clone(),
                    r.text.clone(),
                    r.recommendation_id.clone(),
                    r.subscription_id.clone(),
                    r.subscription_name.clone(),
                    r.resource_group.clone(),
                    r.resource_name.clone(),
                    r.resource_id.clone(),
                    r.sla().to_string(),
                    (!r.not_compliant).to_string(),
                    r.learn_more_url.clone(),
                ]
            })
            .collect();
        ReportTable::new("recommendations", "Recommendations", &RECOMMENDATION_HEADERS)
            .with_rows(rows)
    }

    /// Non-compliant findings only; SLA notes are not impacts
    fn impacted_table(findings: &[RecommendationResult]) -> ReportTable {
        let rows = findings
            .iter()
            .filter(|r| r.not_compliant)
            .map(|r| {
                let mut row = vec![
                    validated_using(&r.source).to_string(),
                    r.source.to_string(),
                    r.category.to_string(),
                    r.impact.to_string(),
                    r.resource_type.clone(),
                    r.text.clone(),
                    r.recommendation_id.clone(),
                    r.subscription_id.clone(),
                    r.subscription_name.clone(),
                    r.resource_group.clone(),
                    r.resource_name.clone(),
                    r.resource_id.clone(),
                ];
                row.extend(r.params.iter().cloned());
                row.push(r.learn_more_url.clone());
                row
            })
            .collect();
        ReportTable::new("impacted", "Impacted Resources", &IMPACTED_HEADERS).with_rows(rows)
    }

    fn resource_types_table(report: &ReportData) -> ReportTable {
        let rows = report
            .resource_type_counts
            .iter()
            .map(|c| {
                vec![
                    c.subscription_id.clone(),
                    c.subscription_name.clone(),
                    c.resource_type.clone(),
                    c.count.to_string(),
                    if c.covered_by_catalog { "Yes" } else { "No" }.to_string(),
                ]
            })
            .collect();
        ReportTable::new(
            "resourceType",
            "Resource Types",
            &[
                "Subscription Id",
                "Subscription Name",
                "Resource Type",
                "Number of Resources",
                "Available in Catalog?",
            ],
        )
        .with_rows(rows)
    }

    fn resources_table(key: &str, title: &str, resources: &[Resource]) -> ReportTable {
        let rows = resources
            .iter()
            .map(|r| {
                vec![
                    r.subscription_id.clone(),
                    r.resource_group.clone(),
                    r.location.clone(),
                    r.resource_type.clone(),
                    r.name.clone(),
                    r.sku_name.clone(),
                    r.sku_tier.clone(),
                    r.kind.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        ReportTable::new(key, title, &RESOURCE_HEADERS).with_rows(rows)
    }

    fn advisor_table(report: &ReportData) -> ReportTable {
        let rows = report
            .advisor
            .iter()
            .map(|a| {
                vec![
                    a.subscription_id.clone(),
                    a.subscription_name.clone(),
                    a.name.clone(),
                    a.resource_type.clone(),
                    a.category.clone(),
                    a.impact.clone(),
                    a.description.clone(),
                    a.resource_id.clone(),
                    a.recommendation_id.clone(),
                ]
            })
            .collect();
        ReportTable::new(
            "advisor",
            "Advisor",
            &[
                "Subscription Id",
                "Subscription Name",
                "Name",
                "Type",
                "Category",
                "Impact",
                "Description",
                "Resource Id",
                "Recommendation Id",
            ],
        )
        .with_rows(rows)
    }

    fn policy_table(report: &ReportData) -> ReportTable {
        let rows = report
            .policy
            .iter()
            .map(|p| {
                vec![
                    p.subscription_id.clone(),
                    p.subscription_name.clone(),
                    p.resource_group.clone(),
                    p.resource_type.clone(),
                    p.name.clone(),
                    p.policy_display_name.clone(),
                    p.policy_description.clone(),
                    p.resource_id.clone(),
                    p.timestamp.clone(),
                    p.policy_definition_name.clone(),
                    p.policy_definition_id.clone(),
                    p.policy_assignment_name.clone(),
                    p.policy_assignment_id.clone(),
                    p.compliance_state.clone(),
                ]
            })
            .collect();
        ReportTable::new(
            "azurePolicy",
            "Azure Policy",
            &[
                "Subscription Id",
                "Subscription Name",
                "Resource Group",
                "Resource Type",
                "Resource Name",
                "Policy Display Name",
                "Policy Description",
                "Resource Id",
                "Time Stamp",
                "Policy Definition Name",
                "Policy Definition Id",
                "Policy Assignment Name",
                "Policy Assignment Id",
                "Compliance State",
            ],
        )
        .with_rows(rows)
    }

    fn arc_sql_table(report: &ReportData) -> ReportTable {
        let rows = report
            .arc_sql
            .iter()
            .map(|a| {
                vec![
                    a.subscription_id.clone(),
                    a.subscription_name.clone(),
                    a.status.clone(),
                    a.arc_server.clone(),
                    a.sql_instance.clone(),
                    a.resource_group.clone(),
                    a.version.clone(),
                    a.build.clone(),
                    a.patch_level.clone(),
                    a.edition.clone(),
                    a.vcores.clone(),
                    a.license.clone(),
                    a.dps_status.clone(),
                    a.tel_status.clone(),
                    a.defender_status.clone(),
                ]
            })
            .collect();
        ReportTable::new(
            "arcSQL",
            "Arc-enabled SQL Server",
            &[
                "Subscription Id",
                "Subscription Name",
                "Status",
                "Azure Arc Server",
                "SQL Instance",
                "Resource Group",
                "Version",
                "Build",
                "Patch Level",
                "Edition",
                "VCores",
                "License",
                "DPS Status",
                "TEL Status",
                "Defender Status",
            ],
        )
        .with_rows(rows)
    }

    fn defender_table(report: &ReportData) -> ReportTable {
        let rows = report
            .defender
            .iter()
            .map(|d| {
                vec![
                    d.subscription_id.clone(),
                    d.subscription_name.clone(),
                    d.name.clone(),
                    d.tier.clone(),
                    d.deprecated.to_string(),
                ]
            })
            .collect();
        ReportTable::new(
            "defender",
            "Defender",
            &["Subscription Id", "Subscription Name", "Name", "Tier", "Deprecated"],
        )
        .with_rows(rows)
    }

    fn defender_recommendations_table(report: &ReportData) -> ReportTable {
        let rows = report
            .defender_recommendations
            .iter()
            .map(|d| {
                vec![
                    d.subscription_id.clone(),
                    d.subscription_name.clone(),
                    d.resource_group.clone(),
                    d.resource_type.clone(),
                    d.resource_name.clone(),
                    d.category.clone(),
                    d.severity.clone(),
                    d.recommendation_name.clone(),
                    d.action_description.clone(),
                    d.remediation_description.clone(),
                    d.portal_link.clone(),
                    d.resource_id.clone(),
                ]
            })
            .collect();
        ReportTable::new(
            "defenderRecommendations",
            "Defender Recommendations",
            &[
                "Subscription Id",
                "Subscription Name",
                "Resource Group",
                "Resource Type",
                "Resource Name",
                "Category",
                "Recommendation Severity",
                "Recommendation Name",
                "Action Description",
                "Remediation Description",
                "AzPortal Link",
                "Resource Id",
            ],
        )
        .with_rows(rows)
    }

    fn costs_table(report: &ReportData) -> ReportTable {
        let rows = report
            .costs
            .iter()
            .flat_map(|cost| {
                cost.items.iter().map(move |item| {
                    vec![
                        cost.from.to_string(),
                        cost.to.to_string(),
                        item.subscription_id.clone(),
                        item.subscription_name.clone(),
                        item.service_name.clone(),
                        item.value.clone(),
                        item.currency.clone(),
                    ]
                })
            })
            .collect();
        ReportTable::new(
            "costs",
            "Costs",
            &[
                "From",
                "To",
                "Subscription Id",
                "Subscription Name",
                "Service Name",
                "Value",
                "Currency",
            ],
        )
        .with_rows(rows)
    }

    fn carbon_table(report: &ReportData) -> ReportTable {
        let rows = report
            .carbon
            .iter()
            .map(|c| {
                vec![
                    c.from.to_string(),
                    c.to.to_string(),
                    c.resource_type.clone(),
                    format!("{:.2}", c.latest_month),
                    format!("{:.2}", c.previous_month),
                    c.month_over_month_ratio()
                        .map(|r| format!("{:.4}", r))
                        .unwrap_or_default(),
                    format!("{:.2}", c.monthly_change_value),
                    c.unit.clone(),
                ]
            })
            .collect();
        ReportTable::new(
            "carbon",
            "Carbon Emissions",
            &[
                "From",
                "To",
                "Resource Type",
                "Latest Month Emissions",
                "Previous Month Emissions",
                "Month Over Month Change Ratio",
                "Monthly Change Value",
                "Unit",
            ],
        )
        .with_rows(rows)
    }

    fn plugin_tables(report: &ReportData) -> Vec<ReportTable> {
        report
            .plugin_outputs
            .iter()
            .map(|output| {
                let headers: Vec<&str> = output.headers.iter().map(String::as_str).collect();
                ReportTable::new(
                    format!("plugin-{}", output.plugin_name),
                    if output.description.is_empty() {
                        output.plugin_name.clone()
                    } else {
                        output.description.clone()
                    },
                    &headers,
                )
                .with_rows(output.rows.clone())
            })
            .collect()
    }
}

/// How a finding was established
fn validated_using(source: &Source) -> &'static str {
    match source {
        Source::Aprl | Source::Orphan | Source::Plugin(_) => "Azure Resource Graph",
        Source::Azqr => "Azure Resource Manager",
        Source::Advisor => "Azure Advisor",
        Source::Policy => "Azure Policy",
    }
}
