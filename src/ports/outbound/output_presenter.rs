use super::RenderedFile;
use crate::shared::Result;
use std::path::PathBuf;

/// OutputPresenter port for persisting formatted reports
pub trait OutputPresenter {
    /// Writes the files and returns their final paths
    ///
    /// # Errors
    /// Returns an error if:
    /// - The output directory is missing or a symlink
    /// - Writing any file fails
    fn present(&self, files: &[RenderedFile]) -> Result<Vec<PathBuf>>;
}
