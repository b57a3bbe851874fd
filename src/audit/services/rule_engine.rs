use crate::audit::domain::{
    AuxiliaryIndexes, Filters, Recommendation, RecommendationResult, RecommendationType,
    ResourceInstance, RuleOutcome,
};
use std::collections::BTreeMap;

/// RuleEngine - applies code rules to an already-fetched resource
///
/// Evaluation functions only see the resource and the preflight indexes,
/// so the engine never performs I/O.
pub struct RuleEngine;

impl RuleEngine {
    /// Runs every code rule in `rules` against `resource`.
    ///
    /// Graph and manual rules are ignored, as are rules whose id is in the
    /// recommendation exclude set.
    ///
    /// # Returns
    /// Map from rule id to outcome
    pub fn evaluate<'a, I>(
        rules: I,
        resource: &ResourceInstance,
        indexes: &AuxiliaryIndexes,
        filters: &Filters,
    ) -> BTreeMap<String, RuleOutcome>
    where
        I: IntoIterator<Item = &'a Recommendation>,
    {
        rules
            .into_iter()
            .filter(|rule| !filters.is_recommendation_excluded(&rule.id))
            .filter_map(|rule| {
                rule.eval_fn()
                    .map(|eval| (rule.id.clone(), eval(resource, indexes)))
            })
            .collect()
    }

    /// Converts outcomes into report rows.
    ///
    /// Broken outcomes always produce a row. SLA rules produce a row with
    /// `not_compliant = false` whenever they carry a note.
    pub fn to_results<'a, I>(
        rules: I,
        outcomes: &BTreeMap<String, RuleOutcome>,
        resource: &ResourceInstance,
        subscription_name: &str,
    ) -> Vec<RecommendationResult>
    where
        I: IntoIterator<Item = &'a Recommendation>,
    {
        rules
            .into_iter()
            .filter_map(|rule| {
                let outcome = outcomes.get(&rule.id)?;
                let is_sla_note = rule.recommendation_type == RecommendationType::Sla
                    && !outcome.note.is_empty();
                if !outcome.broken && !is_sla_note {
                    return None;
                }

                let mut result = RecommendationResult::for_recommendation(rule, resource.id());
                result.resource_type = resource.resource.resource_type.clone();
                result.resource_name = resource.name().to_string();
                result.resource_group = resource.resource.resource_group.clone();
                result.subscription_id = resource.resource.subscription_id.clone();
                result.subscription_name = subscription_name.to_string();
                result.not_compliant = outcome.broken;
                result.note = outcome.note.clone();
                result.params[0] = outcome.note.clone();
                Some(result)
            })
            .collect()
    }

    /// evaluate + to_results for one resource
    pub fn scan_resource(
        rules: &[&Recommendation],
        resource: &ResourceInstance,
        indexes: &AuxiliaryIndexes,
        filters: &Filters,
        subscription_name: &str,
    ) -> Vec<RecommendationResult> {
        let outcomes = Self::evaluate(rules.iter().copied(), resource, indexes, filters);
        Self::to_results(rules.iter().copied(), &outcomes, resource, subscription_name)
    }
}
