use crate::application::read_models::ReportReadModel;
use crate::shared::Result;

/// A formatted output file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// File name relative to the output directory
    pub file_name: String,
    pub contents: String,
}

/// ReportFormatter port for turning the report read model into files
///
/// One formatter may emit several files (CSV writes one per table).
pub trait ReportFormatter {
    /// Formats the report
    ///
    /// # Arguments
    /// * `model` - Aggregated, masked report tables
    /// * `output_name` - Prefix for every emitted file name
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, model: &ReportReadModel, output_name: &str) -> Result<Vec<RenderedFile>>;
}
