use crate::application::stages::StageSelection;
use crate::audit::domain::Filters;

/// ScanRequest - Internal request DTO for the scan use case
///
/// Carries the merged filter set (filter file plus CLI scope flags) and
/// every switch that shapes the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub filters: Filters,
    /// Discover subscriptions through these management groups instead of
    /// the subscription listing
    pub management_groups: Vec<String>,
    /// Scanner abbreviations restricting code-scan; empty means all
    pub scanners: Vec<String>,
    pub stages: StageSelection,
    /// Plugin names to enable from the plugin directory
    pub enabled_plugins: Vec<String>,
    pub mask: bool,
}

impl ScanRequest {
    pub fn new(filters: Filters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }
}
