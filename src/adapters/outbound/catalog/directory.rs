use crate::audit::domain::Source;
use crate::audit::services::CatalogFile;
use crate::ports::outbound::CatalogSource;
use crate::shared::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// DirectoryCatalog adapter reading a catalog tree from disk
///
/// Used for `--catalog-dir`, which swaps the embedded curated tree for an
/// on-disk tree of the same layout.
pub struct DirectoryCatalog {
    root: PathBuf,
    source: Source,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>, source: Source) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    fn is_catalog_file(path: &Path) -> bool {
        matches!(
            path.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .as_deref(),
            Some("yaml") | Some("yml") | Some("kql")
        )
    }
}

impl CatalogSource for DirectoryCatalog {
    fn source(&self) -> Source {
        self.source.clone()
    }

    fn files(&self) -> Result<Vec<CatalogFile>> {
        if !self.root.is_dir() {
            anyhow::bail!(
                "Catalog directory not found: {}\n\n💡 Hint: --catalog-dir must point to a directory of .yaml and .kql files",
                self.root.display()
            );
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk catalog directory: {}", self.root.display()))?;
            if !entry.file_type().is_file() || !Self::is_catalog_file(entry.path()) {
                continue;
            }
            let contents = std::fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read catalog file: {}", entry.path().display()))?;
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            files.push(CatalogFile::new(relative, contents));
        }
        Ok(files)
    }
}
