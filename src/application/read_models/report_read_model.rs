//! Report read model consumed by the renderers
//!
//! Every section is already flattened into a [`ReportTable`], masked when
//! requested, so renderers only decide layout.

use super::report_table::ReportTable;

/// Aggregated report of one scan
#[derive(Debug, Clone)]
pub struct ReportReadModel {
    pub metadata: ReportMetadataView,
    /// One row per unique (resource id, recommendation id)
    pub recommendations: ReportTable,
    pub impacted: ReportTable,
    pub resource_types: ReportTable,
    pub inventory: ReportTable,
    pub out_of_scope: ReportTable,
    pub advisor: ReportTable,
    pub azure_policy: ReportTable,
    pub arc_sql: ReportTable,
    pub defender: ReportTable,
    pub defender_recommendations: ReportTable,
    pub costs: ReportTable,
    pub carbon: ReportTable,
    /// One table per plugin, keyed `plugin-<name>`
    pub plugins: Vec<ReportTable>,
}

impl ReportReadModel {
    /// Core and provider tables in report order; plugin tables excluded
    pub fn tables(&self) -> [&ReportTable; 12] {
        [
            &self.recommendations,
            &self.impacted,
            &self.resource_types,
            &self.inventory,
            &self.out_of_scope,
            &self.advisor,
            &self.azure_policy,
            &self.arc_sql,
            &self.defender,
            &self.defender_recommendations,
            &self.costs,
            &self.carbon,
        ]
    }

    /// Tables whose stage took part in the run, plugin tables last
    pub fn enabled_tables(&self) -> Vec<&ReportTable> {
        self.tables()
            .into_iter()
            .chain(self.plugins.iter())
            .filter(|t| t.enabled)
            .collect()
    }
}

/// Run-level facts printed alongside the tables
#[derive(Debug, Clone)]
pub struct ReportMetadataView {
    pub scan_id: String,
    /// RFC 3339 start time of the scan
    pub generated_at: String,
    pub tool_name: String,
    pub tool_version: String,
    pub masked: bool,
    pub subscriptions: usize,
    pub stages: Vec<StageSummaryView>,
}

/// Per-stage line of the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummaryView {
    pub name: String,
    pub elapsed_ms: u128,
    pub records: usize,
}
