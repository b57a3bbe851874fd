//! Filter file support for azqr.
//!
//! A filter file is a YAML document rooted at `azqr` with optional
//! `include` and `exclude` sections. Loading it yields [`Filters`] ready
//! for the scan request.

use serde::Deserialize;
use std::path::Path;

use crate::adapters::outbound::filesystem::FileSystemReader;
use crate::audit::domain::resource_id::{is_valid_resource_group_id, subscription_from_resource_id};
use crate::audit::domain::Filters;
use crate::shared::error::AuditError;

/// Top-level filter file schema.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterFile {
    #[serde(default)]
    pub azqr: FilterSections,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterSections {
    #[serde(default)]
    pub include: IncludeSection,
    #[serde(default)]
    pub exclude: ExcludeSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct IncludeSection {
    #[serde(default)]
    pub subscriptions: Vec<String>,
    #[serde(default)]
    pub resource_groups: Vec<String>,
    #[serde(default)]
    pub resource_types: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ExcludeSection {
    #[serde(default)]
    pub subscriptions: Vec<String>,
    #[serde(default)]
    pub resource_groups: Vec<String>,
    /// Fully qualified resource ids
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl FilterFile {
    /// Converts the document into filters, validating resource-group ids.
    ///
    /// Each included resource group also includes its subscription.
    pub fn into_filters(self) -> Result<Filters, AuditError> {
        let FilterSections { include, exclude } = self.azqr;

        validate_resource_groups(&include.resource_groups)?;
        validate_resource_groups(&exclude.resource_groups)?;

        let rg_subscriptions: Vec<String> = include
            .resource_groups
            .iter()
            .map(|id| subscription_from_resource_id(id))
            .collect();

        Ok(Filters::new()
            .include_subscriptions(include.subscriptions.iter().chain(rg_subscriptions.iter()))
            .include_resource_groups(&include.resource_groups)
            .include_resource_types(&include.resource_types)
            .exclude_subscriptions(&exclude.subscriptions)
            .exclude_resource_groups(&exclude.resource_groups)
            .exclude_services(&exclude.services)
            .exclude_recommendations(&exclude.recommendations))
    }
}

/// Rejects ids that are not `/subscriptions/{id}/resourceGroups/{name}`
pub fn validate_resource_groups(ids: &[String]) -> Result<(), AuditError> {
    match ids.iter().find(|id| !is_valid_resource_group_id(id)) {
        Some(id) => Err(AuditError::InvalidResourceGroupId { id: id.clone() }),
        None => Ok(()),
    }
}

/// Parses filter YAML. `path` only labels errors.
pub fn parse_filter_file(path: &Path, content: &str) -> Result<Filters, AuditError> {
    let file: FilterFile =
        serde_yaml_ng::from_str(content).map_err(|e| AuditError::FilterFileParse {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
    file.into_filters()
}

/// Load filters from an explicit path. A missing or unreadable file is a
/// configuration error.
pub fn load_filter_file(path: &Path) -> Result<Filters, AuditError> {
    let content = FileSystemReader::new()
        .read_text(path, "filter file")
        .map_err(|e| AuditError::FilterFileRead {
            path: path.to_path_buf(),
            details: format!("{:#}", e),
        })?;
    parse_filter_file(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SUB: &str = "6fd2c3a1-0d4b-4e7f-9a8b-1234567890ab";
    const OTHER: &str = "0a1b2c3d-0000-4000-8000-00000000beef";

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("filters.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_filter_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!(
                r#"
azqr:
  include:
    subscriptions: [{sub}]
    resourceGroups: [/subscriptions/{other}/resourceGroups/rg-app]
    resourceTypes: [Microsoft.Storage/storageAccounts]
  exclude:
    subscriptions: []
    resourceGroups: [/subscriptions/{sub}/resourceGroups/rg-sandbox]
    services: [/subscriptions/{sub}/resourceGroups/rg-data/providers/Microsoft.KeyVault/vaults/kv-legacy]
    recommendations: [st-001]
"#,
                sub = SUB,
                other = OTHER
            ),
        );

        let filters = load_filter_file(&path).unwrap();

        let included = filters.included_subscriptions();
        assert!(included.contains(SUB));
        assert!(included.contains(OTHER));
        assert!(filters
            .included_resource_types()
            .contains("microsoft.storage/storageaccounts"));
        assert!(filters.is_resource_group_excluded(&format!(
            "/subscriptions/{}/resourceGroups/rg-sandbox",
            SUB
        )));
        assert!(filters.is_service_excluded(&format!(
            "/subscriptions/{}/resourceGroups/rg-data/providers/Microsoft.KeyVault/vaults/kv-legacy",
            SUB
        )));
        assert!(filters.is_recommendation_excluded("st-001"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "azqr:\n  exclude:\n    recommendations: [kv-002]\n");

        let filters = load_filter_file(&path).unwrap();

        assert!(filters.included_subscriptions().is_empty());
        assert!(!filters.is_subscription_excluded(SUB));
        assert!(filters.is_recommendation_excluded("kv-002"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "azqr:\n  includes:\n    subscriptions: []\n");

        let err = load_filter_file(&path).unwrap_err();

        assert!(matches!(err, AuditError::FilterFileParse { .. }));
        assert!(err.to_string().contains("includes"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "azqr: [[[broken");

        let err = load_filter_file(&path).unwrap_err();

        assert!(matches!(err, AuditError::FilterFileParse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_filter_file(Path::new("/nonexistent/filters.yaml")).unwrap_err();

        assert!(matches!(err, AuditError::FilterFileRead { .. }));
        assert!(err.to_string().contains("Failed to read filter file"));
    }

    #[test]
    fn test_malformed_resource_group_id_is_rejected() {
        let err = parse_filter_file(
            Path::new("filters.yaml"),
            "azqr:\n  include:\n    resourceGroups: [rg-app]\n",
        )
        .unwrap_err();

        match err {
            AuditError::InvalidResourceGroupId { id } => assert_eq!(id, "rg-app"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
