use crate::audit::domain::{
    Category, Filters, Impact, MetadataState, Recommendation, RuleKind, Source,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::warn;

/// One file from a catalog tree; `path` is relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub path: String,
    pub contents: String,
}

impl CatalogFile {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    fn stem(&self) -> Option<String> {
        Path::new(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }
}

/// Counters reported after loading one tree
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoadSummary {
    pub loaded: usize,
    pub with_query: usize,
    /// Loaded records with no query text; listed but never dispatched
    pub missing_query: usize,
    pub dropped: usize,
}

#[derive(Debug, Deserialize)]
struct LearnMoreLink {
    url: String,
}

/// On-disk record. Accepts both the short field names and the curated
/// catalog's `aprlGuid`/`recommendationControl` spellings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogRecord {
    #[serde(alias = "aprlGuid")]
    recommendation_id: String,
    #[serde(alias = "recommendationResourceType")]
    resource_type: String,
    #[serde(alias = "recommendationControl")]
    category: String,
    #[serde(alias = "recommendationImpact")]
    impact: String,
    #[serde(alias = "description")]
    recommendation: String,
    long_description: String,
    potential_benefits: String,
    learn_more_link: Vec<LearnMoreLink>,
    automation_available: serde_yaml_ng::Value,
    #[serde(default, alias = "recommendationMetadataState")]
    metadata_state: Option<String>,
}

impl CatalogRecord {
    fn into_recommendation(
        self,
        source: &Source,
        query: Option<&String>,
    ) -> std::result::Result<Recommendation, String> {
        if self.recommendation_id.trim().is_empty() {
            return Err("empty recommendationId".to_string());
        }
        if self.resource_type.trim().is_empty() {
            return Err("empty resourceType".to_string());
        }
        let category = Category::parse(&self.category)
            .ok_or_else(|| format!("unknown category '{}'", self.category))?;
        let impact = Impact::parse(&self.impact)
            .ok_or_else(|| format!("unknown impact '{}'", self.impact))?;
        let learn_more_url = self
            .learn_more_link
            .into_iter()
            .next()
            .map(|link| link.url)
            .ok_or_else(|| "learnMoreLink needs at least one entry".to_string())?;

        let kind = match query {
            Some(text) if !text.trim().is_empty() => RuleKind::Graph {
                query: text.clone(),
            },
            _ => RuleKind::Manual,
        };

        let mut recommendation = Recommendation::new(
            self.recommendation_id,
            &self.resource_type,
            category,
            impact,
            self.recommendation,
            source.clone(),
            kind,
        )
        .with_learn_more(learn_more_url)
        .with_metadata_state(
            self.metadata_state
                .as_deref()
                .map(MetadataState::parse)
                .unwrap_or_default(),
        );
        recommendation.long_description = self.long_description;
        recommendation.potential_benefits = self.potential_benefits;
        recommendation.automation_available = truthy(&self.automation_available);
        Ok(recommendation)
    }
}

fn truthy(value: &serde_yaml_ng::Value) -> bool {
    match value {
        serde_yaml_ng::Value::Bool(b) => *b,
        serde_yaml_ng::Value::String(s) => {
            let s = s.trim().to_lowercase();
            !s.is_empty() && s != "false" && s != "no"
        }
        _ => false,
    }
}

/// Process-wide recommendation registry.
///
/// Base entries come from catalog trees and scanner code rules; external
/// entries are plugin overlays keyed by (type, id). Overlays never shadow a
/// base entry with the same key in the merged per-type view.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    base: BTreeMap<String, BTreeMap<String, Recommendation>>,
    external: BTreeMap<(String, String), Recommendation>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `.kql` files by bare filename, then attaches each to the
    /// `.yaml` record whose id matches. Bad records are logged and dropped.
    pub fn load_tree(&mut self, files: &[CatalogFile], source: Source) -> CatalogLoadSummary {
        let mut summary = CatalogLoadSummary::default();

        let queries: HashMap<String, String> = files
            .iter()
            .filter(|f| f.extension().as_deref() == Some("kql"))
            .filter_map(|f| f.stem().map(|stem| (stem, f.contents.clone())))
            .collect();

        for file in files
            .iter()
            .filter(|f| matches!(f.extension().as_deref(), Some("yaml") | Some("yml")))
        {
            if file.contents.trim().is_empty() {
                continue;
            }
            let records: Vec<serde_yaml_ng::Value> = match serde_yaml_ng::from_str(&file.contents)
            {
                Ok(records) => records,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "skipping unparseable catalog file");
                    summary.dropped += 1;
                    continue;
                }
            };

            for value in records {
                let record: CatalogRecord = match serde_yaml_ng::from_value(value) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(path = %file.path, error = %e, "dropping malformed recommendation");
                        summary.dropped += 1;
                        continue;
                    }
                };
                let id = record.recommendation_id.clone();
                match record.into_recommendation(&source, queries.get(&id)) {
                    Ok(recommendation) => {
                        if matches!(recommendation.kind, RuleKind::Manual) {
                            warn!(path = %file.path, id = %id, "recommendation has no query text, it will not be dispatched");
                            summary.missing_query += 1;
                        } else {
                            summary.with_query += 1;
                        }
                        if self.register(recommendation) {
                            summary.loaded += 1;
                        } else {
                            summary.dropped += 1;
                        }
                    }
                    Err(reason) => {
                        warn!(path = %file.path, id = %id, reason = %reason, "dropping recommendation");
                        summary.dropped += 1;
                    }
                }
            }
        }

        summary
    }

    /// Adds a base entry. Returns false (and keeps the first) when the id is
    /// already taken for that type.
    pub fn register(&mut self, recommendation: Recommendation) -> bool {
        let by_id = self
            .base
            .entry(recommendation.resource_type.clone())
            .or_default();
        if by_id.contains_key(&recommendation.id) {
            warn!(
                id = %recommendation.id,
                resource_type = %recommendation.resource_type,
                "duplicate recommendation id for type, keeping the first"
            );
            return false;
        }
        by_id.insert(recommendation.id.clone(), recommendation);
        true
    }

    pub fn register_code_rules<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = Recommendation>,
    {
        for rule in rules {
            self.register(rule);
        }
    }

    /// Adds or replaces a plugin-provided overlay
    pub fn register_external(&mut self, resource_type: &str, mut recommendation: Recommendation) {
        let resource_type = resource_type.to_lowercase();
        recommendation.resource_type = resource_type.clone();
        self.external
            .insert((resource_type, recommendation.id.clone()), recommendation);
    }

    /// Merged view for one type: base entries first, then overlays whose id
    /// is not already taken.
    pub fn recommendations_for_type(&self, resource_type: &str) -> BTreeMap<&str, &Recommendation> {
        let resource_type = resource_type.to_lowercase();
        let mut merged: BTreeMap<&str, &Recommendation> = self
            .base
            .get(&resource_type)
            .map(|by_id| by_id.iter().map(|(id, r)| (id.as_str(), r)).collect())
            .unwrap_or_default();
        for ((t, id), recommendation) in &self.external {
            if *t == resource_type {
                merged.entry(id.as_str()).or_insert(recommendation);
            }
        }
        merged
    }

    /// Every entry, including disabled and sentinel-marked ones
    pub fn all_recommendations(&self) -> Vec<&Recommendation> {
        self.base
            .values()
            .flat_map(|by_id| by_id.values())
            .chain(self.external.values())
            .collect()
    }

    /// Base graph rules that may enter the worker pool's job channel
    pub fn dispatchable_graph_rules(&self, filters: &Filters) -> Vec<Recommendation> {
        self.base
            .values()
            .flat_map(|by_id| by_id.values())
            .filter(|r| r.is_dispatchable_graph_rule())
            .filter(|r| !filters.is_recommendation_excluded(&r.id))
            .filter(|r| !filters.is_resource_type_excluded(&r.resource_type))
            .cloned()
            .collect()
    }

    /// Code rules registered for one type
    pub fn code_rules_for_type(&self, resource_type: &str) -> Vec<&Recommendation> {
        self.base
            .get(&resource_type.to_lowercase())
            .map(|by_id| by_id.values().filter(|r| r.eval_fn().is_some()).collect())
            .unwrap_or_default()
    }

    pub fn external_recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.external.values()
    }

    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .base
            .keys()
            .map(String::as_str)
            .chain(self.external.keys().map(|(t, _)| t.as_str()))
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn covers_type(&self, resource_type: &str) -> bool {
        let resource_type = resource_type.to_lowercase();
        self.base.contains_key(&resource_type)
            || self.external.keys().any(|(t, _)| *t == resource_type)
    }

    pub fn len(&self) -> usize {
        self.base.values().map(BTreeMap::len).sum::<usize>() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
