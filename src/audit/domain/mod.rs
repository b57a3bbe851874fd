pub mod auxiliary_indexes;
pub mod filters;
pub mod findings;
pub mod plugin;
pub mod recommendation;
pub mod recommendation_result;
pub mod report_data;
pub mod resource;
pub mod resource_id;

pub use auxiliary_indexes::AuxiliaryIndexes;
pub use filters::Filters;
pub use findings::{
    AdvisorRecord, ArcSqlInstance, CarbonEmission, CostItem, CostReport, DefenderPlan,
    DefenderRecommendation, PolicyRecord,
};
pub use plugin::{PluginDefinition, PluginOutput};
pub use recommendation::{
    Category, EvalFn, Impact, MetadataState, Recommendation, RecommendationType, RuleKind,
    RuleOutcome, Source, DEVELOPMENT_SENTINELS,
};
pub use recommendation_result::RecommendationResult;
pub use report_data::ReportData;
pub use resource::{Resource, ResourceInstance, ResourceTypeCount};
