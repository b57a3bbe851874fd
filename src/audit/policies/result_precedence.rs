use crate::audit::domain::{RecommendationResult, Source};
use std::collections::HashMap;

/// ResultPrecedence policy for resolving duplicate findings
///
/// Two results collide when they share (resource id, recommendation id).
/// The survivor is chosen by:
/// 1. higher impact (High > Medium > Low)
/// 2. source priority (catalog > plugin > advisor/policy)
/// 3. first seen
pub struct ResultPrecedence;

impl ResultPrecedence {
    /// Rank used to break impact ties; larger wins
    pub fn source_rank(source: &Source) -> u8 {
        match source {
            Source::Aprl | Source::Orphan | Source::Azqr => 3,
            Source::Plugin(_) => 2,
            Source::Advisor | Source::Policy => 1,
        }
    }

    /// Whether `candidate` should replace `incumbent`
    pub fn supersedes(candidate: &RecommendationResult, incumbent: &RecommendationResult) -> bool {
        (candidate.impact, Self::source_rank(&candidate.source))
            > (incumbent.impact, Self::source_rank(&incumbent.source))
    }

    /// Keeps one result per key. Survivors stay at the position where their
    /// key was first seen.
    pub fn deduplicate<I>(results: I) -> Vec<RecommendationResult>
    where
        I: IntoIterator<Item = RecommendationResult>,
    {
        let mut slots: Vec<RecommendationResult> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for result in results {
            match index.get(&result.dedup_key()) {
                Some(&slot) => {
                    if Self::supersedes(&result, &slots[slot]) {
                        slots[slot] = result;
                    }
                }
                None => {
                    index.insert(result.dedup_key(), slots.len());
                    slots.push(result);
                }
            }
        }

        slots
    }
}
