use crate::application::read_models::ReportReadModel;

/// ScanResponse - Internal response DTO from the scan use case
///
/// The report is already aggregated and masked; adapters only render it.
#[derive(Debug, Clone)]
pub struct ScanResponse {
    pub report: ReportReadModel,
    /// Catalog and plugin rules known to the run
    pub recommendations_loaded: usize,
}
