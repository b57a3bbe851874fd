use super::{
    AdvisorRecord, ArcSqlInstance, CarbonEmission, CostReport, DefenderPlan,
    DefenderRecommendation, PluginOutput, PolicyRecord, RecommendationResult, Resource,
    ResourceTypeCount,
};

/// Raw stage outputs accumulated in the scan context
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    /// Graph, code and plugin rule results, in emission order
    pub results: Vec<RecommendationResult>,
    pub resources: Vec<Resource>,
    pub out_of_scope: Vec<Resource>,
    pub resource_type_counts: Vec<ResourceTypeCount>,
    pub advisor: Vec<AdvisorRecord>,
    pub policy: Vec<PolicyRecord>,
    pub defender: Vec<DefenderPlan>,
    pub defender_recommendations: Vec<DefenderRecommendation>,
    pub arc_sql: Vec<ArcSqlInstance>,
    pub costs: Option<CostReport>,
    pub carbon: Vec<CarbonEmission>,
    pub plugin_outputs: Vec<PluginOutput>,
}

impl ReportData {
    /// Total number of records across every slice; the pipeline diffs this
    /// around each stage to count records emitted.
    pub fn record_count(&self) -> usize {
        self.results.len()
            + self.resources.len()
            + self.out_of_scope.len()
            + self.resource_type_counts.len()
            + self.advisor.len()
            + self.policy.len()
            + self.defender.len()
            + self.defender_recommendations.len()
            + self.arc_sql.len()
            + self.costs.as_ref().map_or(0, |c| c.items.len())
            + self.carbon.len()
            + self.plugin_outputs.iter().map(|p| p.rows.len()).sum::<usize>()
    }
}
