use super::*;
use crate::adapters::outbound::scanners::builtin_scanners;
use crate::application::pipeline::PipelineError;
use crate::application::stages::names;
use crate::application::stages::StageSelection;
use crate::application::test_support::{SilentProgress, StubGraph, StubManagement};
use crate::audit::domain::{Category, Filters, Impact, Recommendation, RuleKind, Source};
use crate::audit::services::CatalogFile;
use crate::ports::outbound::CloudApiError;
use serde_json::json;
use std::time::Duration;

const SUB: &str = "6fd2c3a1-0d4b-4e7f-9a8b-1234567890ab";

fn storage_id() -> String {
    format!(
        "/subscriptions/{}/resourceGroups/rg-data/providers/Microsoft.Storage/storageAccounts/stdata",
        SUB
    )
}

const TREE_YAML: &str = r#"
- recommendationId: st-zone-01
  resourceType: Microsoft.Storage/storageAccounts
  category: HighAvailability
  impact: High
  recommendation: Use zone-redundant storage
  longDescription: Zone redundancy keeps data available when a zone fails.
  potentialBenefits: Higher durability
  learnMoreLink:
    - url: https://learn.microsoft.com/azure/storage/common/storage-redundancy
  automationAvailable: true
"#;

// Mock implementations for testing
struct TestTree;

impl CatalogSource for TestTree {
    fn source(&self) -> Source {
        Source::Aprl
    }

    fn files(&self) -> Result<Vec<CatalogFile>> {
        Ok(vec![
            CatalogFile::new("Storage/storageAccounts/recommendations.yaml", TREE_YAML),
            CatalogFile::new(
                "Storage/storageAccounts/kql/st-zone-01.kql",
                "resources | where type =~ 'microsoft.storage/storageaccounts' | where sku.name !has 'ZRS' | project id, name",
            ),
        ])
    }
}

struct StaticPlugins(Vec<PluginDefinition>);

impl PluginRepository for StaticPlugins {
    fn load_all(&self) -> Result<Vec<PluginDefinition>> {
        Ok(self.0.clone())
    }
}

fn contoso_plugin() -> PluginDefinition {
    let rule = |id: &str, query: &str| {
        Recommendation::new(
            id,
            "Microsoft.Storage/storageAccounts",
            Category::Governance,
            Impact::High,
            format!("plugin rule {}", id),
            Source::Plugin("contoso".to_string()),
            RuleKind::Graph {
                query: query.to_string(),
            },
        )
    };
    PluginDefinition {
        name: "contoso".to_string(),
        version: "1.0.0".to_string(),
        description: "Contoso checks".to_string(),
        author: "Platform team".to_string(),
        recommendations: vec![
            rule("ct-001", "resources | where tags['env'] == 'dev'"),
            // same id as the catalog rule; the catalog row must survive
            rule("st-zone-01", "resources | where tags['legacy'] == 'true'"),
        ],
    }
}

fn graph() -> Arc<StubGraph> {
    let sa = storage_id();
    Arc::new(
        StubGraph::new()
            .respond("!has 'ZRS'", vec![json!({"id": sa, "name": "stdata"})])
            .respond(
                "tags['env']",
                vec![json!({"id": sa, "name": "stdata", "param1": "dev"})],
            )
            .respond("tags['legacy']", vec![json!({"id": sa, "name": "stdata"})])
            .respond(
                "summarize count()",
                vec![json!({"subscriptionId": SUB, "type": "microsoft.storage/storageaccounts", "count_": 1})],
            )
            .respond(
                "storageaccounts' | project id, name, type",
                vec![json!({
                    "id": sa,
                    "name": "stdata",
                    "type": "Microsoft.Storage/storageAccounts",
                    "location": "westeurope",
                    "sku": {"name": "Standard_LRS", "tier": "Standard"},
                    "tags": {},
                    "properties": {"minimumTlsVersion": "TLS1_0"}
                })],
            )
            .respond(
                "skuName = tostring",
                vec![json!({
                    "id": sa,
                    "subscriptionId": SUB,
                    "resourceGroup": "rg-data",
                    "type": "Microsoft.Storage/storageAccounts",
                    "name": "stdata",
                    "location": "westeurope",
                    "skuName": "Standard_LRS"
                })],
            ),
    )
}

fn use_case_with(
    management: StubManagement,
    plugins: Vec<PluginDefinition>,
) -> RunScanUseCase<StaticPlugins> {
    RunScanUseCase::new(
        graph(),
        Arc::new(management),
        vec![Box::new(TestTree) as Box<dyn CatalogSource>],
        StaticPlugins(plugins),
        ScannerRegistry::new(builtin_scanners()),
        Arc::new(SilentProgress),
    )
    .with_limiter(unlimited())
}

fn unlimited() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(1_000, 1_000, 1_000, Duration::from_millis(1)))
}

fn use_case() -> RunScanUseCase<StaticPlugins> {
    use_case_with(
        StubManagement::with_subscriptions(&[(SUB, "Production", "Enabled")]),
        vec![contoso_plugin()],
    )
}

fn rows_with<'a>(
    table: &'a crate::application::read_models::ReportTable,
    column: &str,
    value: &str,
) -> Vec<&'a Vec<String>> {
    let index = table.column(column).unwrap();
    table.rows.iter().filter(|row| row[index] == value).collect()
}

#[tokio::test]
async fn test_execute_default_run() {
    let response = use_case()
        .execute(ScanRequest::new(Filters::new()), CancellationToken::new())
        .await
        .unwrap();
    let report = response.report;

    let zone = rows_with(&report.recommendations, "Recommendation Id", "st-zone-01");
    assert_eq!(zone.len(), 1);
    let source = report.recommendations.column("Source").unwrap();
    assert_eq!(zone[0][source], "APRL");

    assert_eq!(report.inventory.len(), 1);
    assert_eq!(report.resource_types.len(), 1);
    assert!(report.plugins.is_empty());

    let stages: Vec<&str> = report.metadata.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[0], names::SUBSCRIPTION_DISCOVERY);
    for stage in [
        names::RESOURCE_INVENTORY,
        names::PREFLIGHT,
        names::GRAPH_SCAN,
        names::CODE_SCAN,
        names::RESOURCE_TYPE_COUNT,
    ] {
        assert!(stages.contains(&stage), "{} missing", stage);
    }
}

#[tokio::test]
async fn test_execute_code_rules_reach_report() {
    let response = use_case()
        .execute(ScanRequest::new(Filters::new()), CancellationToken::new())
        .await
        .unwrap();

    let source = response.report.recommendations.column("Source").unwrap();
    assert!(response
        .report
        .recommendations
        .rows
        .iter()
        .any(|row| row[source] == "AZQR"));
}

#[tokio::test]
async fn test_execute_with_plugin() {
    let mut request = ScanRequest::new(Filters::new());
    request.enabled_plugins = vec!["contoso".to_string()];

    let response = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap();
    let report = response.report;

    assert_eq!(report.plugins.len(), 1);
    assert_eq!(report.plugins[0].key, "plugin-contoso");
    assert_eq!(report.plugins[0].len(), 2);

    assert_eq!(rows_with(&report.recommendations, "Recommendation Id", "ct-001").len(), 1);
    // duplicate plugin finding collapses into the catalog row
    let zone = rows_with(&report.recommendations, "Recommendation Id", "st-zone-01");
    assert_eq!(zone.len(), 1);
    let source = report.recommendations.column("Source").unwrap();
    assert_eq!(zone[0][source], "APRL");
    assert!(response.recommendations_loaded >= 3);
}

#[tokio::test]
async fn test_execute_unknown_plugin_is_configuration_error() {
    let mut request = ScanRequest::new(Filters::new());
    request.enabled_plugins = vec!["fabrikam".to_string()];

    let err = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<AuditError>() {
        Some(AuditError::UnknownPlugin { name, available }) => {
            assert_eq!(name, "fabrikam");
            assert_eq!(available, "contoso");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_plugin_only_requires_plugins() {
    let mut request = ScanRequest::new(Filters::new());
    request.stages = StageSelection {
        plugin_only: true,
        ..Default::default()
    };

    let err = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AuditError>(),
        Some(AuditError::InvalidArguments { .. })
    ));
}

#[tokio::test]
async fn test_execute_plugin_only_runs_minimum_stages() {
    let mut request = ScanRequest::new(Filters::new());
    request.enabled_plugins = vec!["contoso".to_string()];
    request.stages = StageSelection {
        plugin_only: true,
        ..Default::default()
    };

    let response = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap();

    let stages: Vec<&str> = response
        .report
        .metadata
        .stages
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(stages.len(), 2);
    assert!(stages.contains(&names::SUBSCRIPTION_DISCOVERY));
    assert!(stages.contains(&names::PLUGIN_SCAN));
    assert_eq!(response.report.plugins.len(), 1);
}

#[tokio::test]
async fn test_execute_scanner_selection_narrows_type_gate() {
    let mut request = ScanRequest::new(Filters::new());
    request.scanners = vec!["kv".to_string()];

    let response = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap();

    assert!(response.report.inventory.is_empty());
    assert_eq!(response.report.out_of_scope.len(), 1);
}

#[tokio::test]
async fn test_execute_unknown_scanner_fails_before_any_stage() {
    let mut request = ScanRequest::new(Filters::new());
    request.scanners = vec!["zz".to_string()];
    let graph = graph();
    let use_case = RunScanUseCase::new(
        graph.clone() as Arc<dyn GraphQuery>,
        Arc::new(StubManagement::default()),
        vec![Box::new(TestTree) as Box<dyn CatalogSource>],
        StaticPlugins(Vec::new()),
        ScannerRegistry::new(builtin_scanners()),
        Arc::new(SilentProgress),
    );

    let err = use_case
        .execute(request, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<AuditError>().is_some());
    assert!(graph.recorded().is_empty());
}

#[tokio::test]
async fn test_execute_stage_failure_names_the_stage() {
    let management = StubManagement {
        failure: Some(CloudApiError::Unauthenticated("token expired".to_string())),
        ..Default::default()
    };

    let err = use_case_with(management, Vec::new())
        .execute(ScanRequest::new(Filters::new()), CancellationToken::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::StageFailed { stage, .. }) => {
            assert_eq!(stage, names::SUBSCRIPTION_DISCOVERY)
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_cancelled_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = use_case()
        .execute(ScanRequest::new(Filters::new()), cancel)
        .await
        .unwrap_err();

    let pipeline_error = err.downcast_ref::<PipelineError>().unwrap();
    assert!(pipeline_error.is_cancelled());
}

#[tokio::test]
async fn test_execute_masks_subscription_ids() {
    let mut request = ScanRequest::new(Filters::new());
    request.mask = true;

    let response = use_case()
        .execute(request, CancellationToken::new())
        .await
        .unwrap();

    for table in response.report.tables() {
        for row in &table.rows {
            assert!(row.iter().all(|cell| !cell.contains(SUB)), "{} leaks", table.key);
        }
    }
}
