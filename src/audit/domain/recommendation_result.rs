use super::{Category, Impact, Recommendation, RecommendationType, Source};

/// A rule that fired (or, for SLA rules, reported) against one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResult {
    pub recommendation_id: String,
    pub resource_id: String,
    pub resource_type: String,
    pub resource_name: String,
    pub resource_group: String,
    pub subscription_id: String,
    pub subscription_name: String,
    pub params: [String; 5],
    pub category: Category,
    pub impact: Impact,
    pub recommendation_type: RecommendationType,
    pub text: String,
    pub learn_more_url: String,
    pub source: Source,
    pub tags: String,
    /// False for rules that only carry a note (SLA)
    pub not_compliant: bool,
    /// Rule note; for SLA rules the computed SLA string
    pub note: String,
}

impl RecommendationResult {
    /// Result skeleton carrying the recommendation's metadata; resource
    /// fields are filled in by the caller.
    pub fn for_recommendation(recommendation: &Recommendation, resource_id: &str) -> Self {
        Self {
            recommendation_id: recommendation.id.clone(),
            resource_id: resource_id.to_string(),
            resource_type: recommendation.resource_type.clone(),
            resource_name: String::new(),
            resource_group: String::new(),
            subscription_id: String::new(),
            subscription_name: String::new(),
            params: Default::default(),
            category: recommendation.category,
            impact: recommendation.impact,
            recommendation_type: recommendation.recommendation_type,
            text: recommendation.text.clone(),
            learn_more_url: recommendation.learn_more_url.clone(),
            source: recommendation.source.clone(),
            tags: String::new(),
            not_compliant: true,
            note: String::new(),
        }
    }

    /// The SLA column: the note of SLA-type rules, empty otherwise
    pub fn sla(&self) -> &str {
        if self.recommendation_type == RecommendationType::Sla {
            &self.note
        } else {
            ""
        }
    }

    /// Deduplication key, compared case-insensitively
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.resource_id.to_lowercase(),
            self.recommendation_id.to_lowercase(),
        )
    }
}
