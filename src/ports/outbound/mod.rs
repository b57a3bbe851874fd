/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (cloud endpoints, file system, console).
pub mod catalog_source;
pub mod cloud_error;
pub mod graph_query;
pub mod management_api;
pub mod output_presenter;
pub mod plugin_repository;
pub mod progress_reporter;
pub mod report_formatter;
pub mod service_scanner;
pub mod token_provider;

pub use catalog_source::CatalogSource;
pub use cloud_error::CloudApiError;
pub use graph_query::{GraphQuery, GraphRow};
pub use management_api::{
    CarbonEmissionItem, DefenderPricing, ManagementApi, ServiceCost, SubscriptionInfo,
};
pub use output_presenter::OutputPresenter;
pub use plugin_repository::PluginRepository;
pub use progress_reporter::ProgressReporter;
pub use report_formatter::{RenderedFile, ReportFormatter};
pub use service_scanner::ServiceScanner;
pub use token_provider::TokenProvider;
