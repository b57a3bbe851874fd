use crate::audit::domain::{
    Category, Impact, MetadataState, PluginDefinition, Recommendation, RuleKind, Source,
};
use crate::ports::outbound::PluginRepository;
use crate::shared::error::AuditError;
use crate::shared::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct PluginFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    queries: Vec<PluginQuery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginQuery {
    #[serde(default, alias = "aprlGuid")]
    recommendation_id: String,
    #[serde(default, alias = "description")]
    recommendation: String,
    #[serde(default, alias = "recommendationControl")]
    category: String,
    #[serde(default, alias = "recommendationImpact")]
    impact: String,
    #[serde(default, alias = "recommendationResourceType")]
    resource_type: String,
    #[serde(default, alias = "recommendationMetadataState")]
    metadata_state: Option<String>,
    #[serde(default)]
    long_description: String,
    #[serde(default)]
    potential_benefits: String,
    #[serde(default)]
    learn_more_link: Vec<LearnMoreLink>,
    #[serde(default)]
    automation_available: bool,
    #[serde(default)]
    query: String,
    #[serde(default)]
    query_file: String,
}

#[derive(Debug, Deserialize)]
struct LearnMoreLink {
    #[serde(default)]
    url: String,
}

/// YamlPluginRepository adapter for plugin files under a directory
///
/// Files that fail validation are skipped with a warning; the first plugin
/// with a given name wins.
pub struct YamlPluginRepository {
    root: PathBuf,
}

impl YamlPluginRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads and validates a single plugin file
    ///
    /// # Errors
    /// Returns `AuditError::PluginLoad` if the file is unreadable, is not a
    /// plugin document, or a query lacks an id or query text.
    pub fn load_file(path: &Path) -> Result<PluginDefinition> {
        let fail = |details: String| AuditError::PluginLoad {
            path: path.to_path_buf(),
            details,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let file: PluginFile =
            serde_yaml_ng::from_str(&contents).map_err(|e| fail(e.to_string()))?;

        if file.name.trim().is_empty() {
            return Err(fail("plugin name is required".to_string()).into());
        }
        if file.queries.is_empty() {
            return Err(fail("plugin must have at least one query".to_string()).into());
        }

        let base_dir = path.parent().unwrap_or(Path::new("."));
        let source = Source::Plugin(file.name.clone());
        let mut recommendations = Vec::with_capacity(file.queries.len());

        for query in file.queries {
            if query.recommendation_id.trim().is_empty() {
                return Err(fail("query missing required field 'aprlGuid'".to_string()).into());
            }
            let id = query.recommendation_id;

            let text = if query.query_file.is_empty() {
                query.query
            } else {
                let query_path = base_dir.join(&query.query_file);
                std::fs::read_to_string(&query_path).map_err(|e| {
                    fail(format!("failed to read query file {}: {}", query.query_file, e))
                })?
            };
            if text.trim().is_empty() {
                return Err(fail(format!(
                    "query {} must have either 'query' or 'queryFile' specified",
                    id
                ))
                .into());
            }
            if query.recommendation.trim().is_empty() {
                return Err(fail(format!("query {} missing required field 'description'", id)).into());
            }

            let category = Category::parse(&query.category)
                .ok_or_else(|| fail(format!("query {} has unknown category '{}'", id, query.category)))?;
            let impact = Impact::parse(&query.impact)
                .ok_or_else(|| fail(format!("query {} has unknown impact '{}'", id, query.impact)))?;

            let mut recommendation = Recommendation::new(
                id,
                &query.resource_type,
                category,
                impact,
                query.recommendation,
                source.clone(),
                RuleKind::Graph { query: text },
            )
            .with_metadata_state(
                query
                    .metadata_state
                    .as_deref()
                    .map(MetadataState::parse)
                    .unwrap_or_default(),
            );
            if let Some(link) = query.learn_more_link.into_iter().next() {
                recommendation = recommendation.with_learn_more(link.url);
            }
            recommendation.long_description = query.long_description;
            recommendation.potential_benefits = query.potential_benefits;
            recommendation.automation_available = query.automation_available;
            recommendations.push(recommendation);
        }

        Ok(PluginDefinition {
            name: file.name,
            version: if file.version.is_empty() {
                "1.0.0".to_string()
            } else {
                file.version
            },
            description: file.description,
            author: file.author,
            recommendations,
        })
    }
}

impl PluginRepository for YamlPluginRepository {
    fn load_all(&self) -> Result<Vec<PluginDefinition>> {
        if !self.root.is_dir() {
            debug!(dir = %self.root.display(), "plugin directory not found");
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut plugins = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable plugin path");
                    continue;
                }
            };
            let is_yaml = matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if !entry.file_type().is_file() || !is_yaml {
                continue;
            }

            match Self::load_file(entry.path()) {
                Ok(plugin) => {
                    if !seen.insert(plugin.name.clone()) {
                        debug!(plugin = %plugin.name, path = %entry.path().display(), "skipping duplicate plugin");
                        continue;
                    }
                    debug!(plugin = %plugin.name, queries = plugin.recommendations.len(), "discovered plugin");
                    plugins.push(plugin);
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "skipping invalid plugin file");
                }
            }
        }
        Ok(plugins)
    }
}
