//! Concrete pipeline stages and the default stage set.

mod advisor;
mod arc_sql;
mod carbon;
mod code_scan;
mod cost;
mod defender;
mod discovery;
mod graph_scan;
mod inventory;
mod plugin_scan;
mod policy;
mod preflight;
mod resource_type_count;

pub use advisor::AdvisorScan;
pub use arc_sql::ArcSqlScan;
pub use carbon::{carbon_window, CarbonScan};
pub use code_scan::CodeScan;
pub use cost::{cost_window, CostScan};
pub use defender::DefenderScan;
pub use discovery::SubscriptionDiscovery;
pub use graph_scan::GraphScan;
pub use inventory::ResourceInventory;
pub use plugin_scan::PluginScan;
pub use policy::PolicyScan;
pub use preflight::Preflight;
pub use resource_type_count::ResourceTypeCount;

use super::pipeline::{PipelineBuilder, PipelineError, PipelinePreset, Stage};
use crate::ports::outbound::CloudApiError;
use tracing::info;

/// Stage names, as accepted by `--stages`
pub mod names {
    pub const SUBSCRIPTION_DISCOVERY: &str = "subscription-discovery";
    pub const RESOURCE_INVENTORY: &str = "resource-inventory";
    pub const PREFLIGHT: &str = "preflight";
    pub const GRAPH_SCAN: &str = "graph-scan";
    pub const CODE_SCAN: &str = "code-scan";
    pub const RESOURCE_TYPE_COUNT: &str = "resource-type-count";
    pub const ADVISOR_SCAN: &str = "advisor-scan";
    pub const POLICY_SCAN: &str = "policy-scan";
    pub const DEFENDER_SCAN: &str = "defender-scan";
    pub const ARC_SCAN: &str = "arc-scan";
    pub const COST_SCAN: &str = "cost-scan";
    pub const CARBON_SCAN: &str = "carbon-scan";
    pub const PLUGIN_SCAN: &str = "plugin-scan";
}

use names::*;

/// Which optional stages a run enables, plus explicit `--stages` overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSelection {
    pub advisor: bool,
    pub policy: bool,
    pub defender: bool,
    pub arc: bool,
    pub cost: bool,
    pub carbon: bool,
    pub plugins: bool,
    pub plugin_only: bool,
    /// Applied last, in order: (stage name, enabled)
    pub overrides: Vec<(String, bool)>,
}

impl StageSelection {
    /// Parses `a,-b,+c` into overrides; a leading `-` disables
    pub fn parse_overrides(spec: &str) -> Vec<(String, bool)> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('-') {
                Some(name) => (name.trim().to_string(), false),
                None => (s.trim_start_matches('+').trim().to_string(), true),
            })
            .collect()
    }
}

/// Registers every stage with its dependencies and applies `selection`
///
/// # Errors
/// `PipelineError::UnknownStage` for an override naming no stage
pub fn default_pipeline(selection: &StageSelection) -> Result<PipelineBuilder, PipelineError> {
    let root = [SUBSCRIPTION_DISCOVERY];
    let preset = if selection.plugin_only {
        PipelinePreset::PluginOnly
    } else {
        PipelinePreset::Default
    };

    let mut builder = PipelineBuilder::new()
        .preset(preset)
        .add_stage(Stage::new(SUBSCRIPTION_DISCOVERY, SubscriptionDiscovery))
        .add_stage(Stage::new(RESOURCE_INVENTORY, ResourceInventory).depends_on(root))
        .add_stage(Stage::new(PREFLIGHT, Preflight::default()).depends_on([RESOURCE_INVENTORY]))
        .add_stage(Stage::new(GRAPH_SCAN, GraphScan::default()).depends_on(root))
        .add_stage(Stage::new(CODE_SCAN, CodeScan).depends_on([PREFLIGHT]))
        .add_stage(Stage::new(RESOURCE_TYPE_COUNT, ResourceTypeCount).depends_on(root))
        .add_stage(
            Stage::new(ADVISOR_SCAN, AdvisorScan)
                .depends_on(root)
                .enabled(selection.advisor),
        )
        .add_stage(
            Stage::new(POLICY_SCAN, PolicyScan)
                .depends_on(root)
                .enabled(selection.policy),
        )
        .add_stage(
            Stage::new(DEFENDER_SCAN, DefenderScan)
                .depends_on(root)
                .enabled(selection.defender),
        )
        .add_stage(
            Stage::new(ARC_SCAN, ArcSqlScan)
                .depends_on(root)
                .enabled(selection.arc),
        )
        .add_stage(
            Stage::new(COST_SCAN, CostScan)
                .depends_on(root)
                .enabled(selection.cost),
        )
        .add_stage(
            Stage::new(CARBON_SCAN, CarbonScan)
                .depends_on(root)
                .enabled(selection.carbon),
        )
        .add_stage(
            Stage::new(PLUGIN_SCAN, PluginScan)
                .depends_on(root)
                .enabled(selection.plugins || selection.plugin_only),
        );

    for (name, enabled) in &selection.overrides {
        builder.set_enabled(name, *enabled)?;
    }
    Ok(builder)
}

/// Turns provider capability errors into an empty result
///
/// Features a subscription is not registered for are reported at info and
/// treated as "nothing to show"; every other error is returned.
pub(crate) fn tolerate_capability<T: Default>(
    stage: &str,
    result: Result<T, CloudApiError>,
) -> Result<T, CloudApiError> {
    match result {
        Err(e) if e.is_capability_error() => {
            info!(stage, error = %e, "feature not available, continuing with an empty projection");
            Ok(T::default())
        }
        other => other,
    }
}
