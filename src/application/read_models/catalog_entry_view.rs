use crate::audit::domain::{MetadataState, Recommendation, RecommendationType, RuleKind};
use serde::Serialize;

/// Serializable view of one catalog entry, as printed by the
/// `recommendations` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryView {
    pub recommendation_id: String,
    pub resource_type: String,
    pub category: String,
    pub impact: String,
    pub recommendation: String,
    pub long_description: String,
    pub potential_benefits: String,
    pub learn_more_link: String,
    pub automation_available: bool,
    pub source: String,
    /// `graph`, `code` or `manual`
    pub kind: &'static str,
    pub sla: bool,
    pub disabled: bool,
    pub under_development: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl From<&Recommendation> for CatalogEntryView {
    fn from(r: &Recommendation) -> Self {
        Self {
            recommendation_id: r.id.clone(),
            resource_type: r.resource_type.clone(),
            category: r.category.as_str().to_string(),
            impact: r.impact.as_str().to_string(),
            recommendation: r.text.clone(),
            long_description: r.long_description.clone(),
            potential_benefits: r.potential_benefits.clone(),
            learn_more_link: r.learn_more_url.clone(),
            automation_available: r.automation_available,
            source: r.source.label().to_string(),
            kind: match r.kind {
                RuleKind::Graph { .. } => "graph",
                RuleKind::Code { .. } => "code",
                RuleKind::Manual => "manual",
            },
            sla: r.recommendation_type == RecommendationType::Sla,
            disabled: r.metadata_state == MetadataState::Disabled,
            under_development: r.is_under_development(),
            query: r.query().map(str::to_string),
        }
    }
}
