//! azqr - fleet-wide best-practice scanner for cloud subscriptions
//!
//! This library discovers the subscriptions in scope, inventories their
//! resources, evaluates a recommendation catalog against them (provider-side
//! graph queries plus in-process code rules) and aggregates everything into
//! report tables, following hexagonal architecture.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`audit`): Recommendations, results, filters, catalog and rule engine
//! - **Application Layer** (`application`): Stage pipeline, worker pool, rate limiter and the scan use case
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use azqr::prelude::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn scan() -> Result<()> {
//! // Create adapters
//! let tokens: Arc<dyn TokenProvider> = Arc::new(CliTokenProvider::from_env());
//! let graph = Arc::new(ResourceGraphClient::new(Arc::clone(&tokens))?);
//! let management = Arc::new(ManagementClient::new(tokens)?);
//! let catalog: Vec<Box<dyn CatalogSource>> = EmbeddedCatalog::all()
//!     .into_iter()
//!     .map(|tree| Box::new(tree) as Box<dyn CatalogSource>)
//!     .collect();
//!
//! // Create use case
//! let use_case = RunScanUseCase::new(
//!     graph,
//!     management,
//!     catalog,
//!     YamlPluginRepository::new("./plugins"),
//!     ScannerRegistry::new(builtin_scanners()),
//!     Arc::new(StderrProgressReporter::new()),
//! );
//!
//! // Execute
//! let request = ScanRequest::new(Filters::new());
//! let response = use_case.execute(request, CancellationToken::new()).await?;
//!
//! // Format output
//! let files = JsonFormatter::new().format(&response.report, "plan")?;
//! println!("{}", files[0].contents);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod audit;
pub mod cli;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::catalog::{DirectoryCatalog, EmbeddedCatalog};
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::credentials::CliTokenProvider;
    pub use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
    pub use crate::adapters::outbound::formatters::{CsvFormatter, JsonFormatter, MarkdownFormatter};
    pub use crate::adapters::outbound::network::{ManagementClient, ResourceGraphClient};
    pub use crate::adapters::outbound::plugins::YamlPluginRepository;
    pub use crate::adapters::outbound::scanners::builtin_scanners;
    pub use crate::application::dto::{OutputFormat, ScanRequest, ScanResponse};
    pub use crate::application::pipeline::PipelineError;
    pub use crate::application::read_models::{ReportReadModel, ReportTable};
    pub use crate::application::scanner_registry::ScannerRegistry;
    pub use crate::application::stages::StageSelection;
    pub use crate::application::use_cases::RunScanUseCase;
    pub use crate::audit::domain::{
        Category, Filters, Impact, PluginDefinition, Recommendation, RecommendationResult,
        RuleKind, Source,
    };
    pub use crate::audit::services::Catalog;
    pub use crate::ports::outbound::{
        CatalogSource, GraphQuery, ManagementApi, OutputPresenter, PluginRepository,
        ProgressReporter, ReportFormatter, TokenProvider,
    };
    pub use crate::shared::error::{AuditError, ExitCode};
    pub use crate::shared::Result;
}
