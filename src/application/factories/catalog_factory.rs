use crate::application::scanner_registry::ScannerRegistry;
use crate::audit::services::Catalog;
use crate::ports::outbound::CatalogSource;
use crate::shared::Result;
use anyhow::Context;
use tracing::info;

/// Factory for assembling the process-wide recommendation catalog
///
/// Trees load in the order given, then every scanner's code rules. The
/// first entry registered for a (type, id) pair wins.
pub struct CatalogFactory;

impl CatalogFactory {
    /// Builds the catalog from catalog trees and scanner code rules
    ///
    /// # Errors
    /// Returns an error if a tree cannot be enumerated. Malformed records
    /// inside a tree are logged and dropped instead.
    pub fn build(sources: &[Box<dyn CatalogSource>], scanners: &ScannerRegistry) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for source in sources {
            let label = source.source();
            let files = source
                .files()
                .with_context(|| format!("Failed to read the {} catalog tree", label))?;
            let summary = catalog.load_tree(&files, label.clone());
            info!(
                source = %label,
                loaded = summary.loaded,
                with_query = summary.with_query,
                missing_query = summary.missing_query,
                dropped = summary.dropped,
                "catalog tree loaded"
            );
        }
        catalog.register_code_rules(scanners.recommendations());
        Ok(catalog)
    }
}
