//! Report fixture shared by the formatter tests

use crate::application::pipeline::StageMetrics;
use crate::application::read_models::{ReportReadModel, ReportReadModelBuilder};
use crate::application::stages::names;
use crate::application::test_support;
use crate::audit::domain::{
    Category, Impact, PluginOutput, Recommendation, RecommendationResult, Resource, RuleKind,
    Source,
};
use chrono::Utc;
use std::time::Duration;

pub const STORAGE_ID: &str =
    "/subscriptions/S1/resourceGroups/rg-data/providers/Microsoft.Storage/storageAccounts/data|prod";

fn result(id: &str, text: &str, impact: Impact, source: Source) -> RecommendationResult {
    let rec = Recommendation::new(
        id,
        "microsoft.storage/storageaccounts",
        Category::Security,
        impact,
        text,
        source,
        RuleKind::Manual,
    )
    .with_learn_more("https://learn.microsoft.com/azure/storage");
    let mut result = RecommendationResult::for_recommendation(&rec, STORAGE_ID);
    result.subscription_id = "S1".to_string();
    result.subscription_name = "Production".to_string();
    result.resource_group = "rg-data".to_string();
    result.resource_name = "data|prod".to_string();
    result
}

/// Two findings, one inventoried resource, one plugin table; inventory
/// and plugin-scan ran, advisor did not.
pub fn report() -> ReportReadModel {
    let mut ctx = test_support::context();
    ctx.report.results = vec![
        result("st-001", "Enable soft delete", Impact::High, Source::Aprl),
        result("st-tls", "Enforce TLS 1.2\nor later", Impact::Medium, Source::Azqr),
    ];
    ctx.report.resources = vec![Resource {
        id: STORAGE_ID.to_string(),
        subscription_id: "S1".to_string(),
        resource_group: "rg-data".to_string(),
        location: "westeurope".to_string(),
        resource_type: "microsoft.storage/storageaccounts".to_string(),
        name: "data|prod".to_string(),
        ..Default::default()
    }];
    ctx.report.plugin_outputs = vec![PluginOutput {
        plugin_name: "contoso".to_string(),
        description: "Contoso checks".to_string(),
        headers: vec!["Subscription Id".to_string(), "Resource Name".to_string()],
        rows: vec![vec!["S1".to_string(), "data|prod".to_string()]],
    }];
    for stage in [names::RESOURCE_INVENTORY, names::PLUGIN_SCAN] {
        let now = Utc::now();
        ctx.metrics.insert(
            stage.to_string(),
            StageMetrics {
                elapsed: Duration::from_millis(12),
                records: 1,
                error: None,
                started_at: now,
                finished_at: now,
            },
        );
    }
    ReportReadModelBuilder::build(&ctx, false)
}
