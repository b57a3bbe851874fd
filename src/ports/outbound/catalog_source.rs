use crate::audit::domain::Source;
use crate::audit::services::CatalogFile;
use crate::shared::Result;

/// CatalogSource port for a tree of recommendation files
///
/// A tree holds `.yaml` recommendation lists and `.kql` query files;
/// the catalog binds them by filename.
pub trait CatalogSource {
    /// Label stamped on every recommendation loaded from this tree
    fn source(&self) -> Source;

    /// Every file in the tree, paths relative to its root
    ///
    /// # Errors
    /// Returns an error if the tree cannot be enumerated or read
    fn files(&self) -> Result<Vec<CatalogFile>>;
}
