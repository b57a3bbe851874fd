//! Read models for the report
//!
//! This module contains the flattened, render-ready view of a finished
//! scan. Renderers consume these types and never the scan context.

mod catalog_entry_view;
mod report_read_model;
mod report_read_model_builder;
mod report_table;

pub use catalog_entry_view::CatalogEntryView;
pub use report_read_model::{ReportMetadataView, ReportReadModel, StageSummaryView};
pub use report_read_model_builder::ReportReadModelBuilder;
pub use report_table::{camel_case, ReportTable};
