use crate::application::dto::{ScanRequest, ScanResponse};
use crate::application::factories::CatalogFactory;
use crate::application::rate_limiter::RateLimiter;
use crate::application::read_models::ReportReadModelBuilder;
use crate::application::scan_context::ScanContext;
use crate::application::scan_services::ScanServices;
use crate::application::scanner_registry::ScannerRegistry;
use crate::application::stages::default_pipeline;
use crate::audit::domain::PluginDefinition;
use crate::ports::outbound::{
    CatalogSource, GraphQuery, ManagementApi, PluginRepository, ProgressReporter,
};
use crate::shared::error::AuditError;
use crate::shared::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

/// RunScanUseCase - Core use case for a fleet scan
///
/// This use case assembles the catalog, selects scanners and plugins,
/// builds the stage pipeline and runs it, then aggregates the context
/// into the report read model.
///
/// # Type Parameters
/// * `PR` - PluginRepository implementation
pub struct RunScanUseCase<PR> {
    graph: Arc<dyn GraphQuery>,
    management: Arc<dyn ManagementApi>,
    catalog_sources: Vec<Box<dyn CatalogSource>>,
    plugin_repository: PR,
    scanners: ScannerRegistry,
    limiter: Arc<RateLimiter>,
    progress_reporter: Arc<dyn ProgressReporter>,
}

impl<PR> RunScanUseCase<PR>
where
    PR: PluginRepository,
{
    /// Creates a new RunScanUseCase with injected dependencies
    pub fn new(
        graph: Arc<dyn GraphQuery>,
        management: Arc<dyn ManagementApi>,
        catalog_sources: Vec<Box<dyn CatalogSource>>,
        plugin_repository: PR,
        scanners: ScannerRegistry,
        progress_reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            graph,
            management,
            catalog_sources,
            plugin_repository,
            scanners,
            limiter: Arc::new(RateLimiter::for_resource_graph()),
            progress_reporter,
        }
    }

    /// Replaces the shared graph rate limiter
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Executes the scan
    ///
    /// Configuration problems (unknown scanner, plugin or stage, a default
    /// run without graph-scan) fail before any stage runs.
    ///
    /// # Errors
    /// - `AuditError` for configuration errors
    /// - `PipelineError` for build errors and failed or cancelled stages
    pub async fn execute(&self, request: ScanRequest, cancel: CancellationToken) -> Result<ScanResponse> {
        // Step 1: Scanner selection narrows code-scan and the type gate
        let scanners = self.scanners.select(&request.scanners)?;
        let mut filters = request.filters;
        if !request.scanners.is_empty() {
            filters = filters.restrict_resource_types(scanners.resource_types());
        }

        // Step 2: Catalog trees plus every scanner's code rules
        let mut catalog = CatalogFactory::build(&self.catalog_sources, &self.scanners)?;

        // Step 3: Enabled plugins overlay the catalog
        let plugins = self.select_plugins(&request.enabled_plugins)?;
        if request.stages.plugin_only && plugins.is_empty() {
            return Err(AuditError::InvalidArguments {
                message: "--plugin-only needs at least one enabled plugin".to_string(),
                hint: "Pass --enable-plugins <name>".to_string(),
            }
            .into());
        }
        for plugin in &plugins {
            for recommendation in &plugin.recommendations {
                catalog.register_external(&recommendation.resource_type, recommendation.clone());
            }
        }
        let recommendations_loaded = catalog.len();
        self.progress_reporter.report(&format!(
            "📚 Loaded {} recommendation(s), {} scanner(s), {} plugin(s)",
            recommendations_loaded,
            scanners.len(),
            plugins.len()
        ));

        // Step 4: Pipeline
        let mut stages = request.stages;
        stages.plugins = !plugins.is_empty();
        let pipeline = default_pipeline(&stages)?.build()?;

        // Step 5: Run
        let services = Arc::new(ScanServices {
            graph: Arc::clone(&self.graph),
            management: Arc::clone(&self.management),
            limiter: Arc::clone(&self.limiter),
            catalog: Arc::new(catalog),
            scanners,
            plugins,
            progress: Arc::clone(&self.progress_reporter),
        });
        let mut ctx = ScanContext::new(services, filters, cancel);
        ctx.management_groups = request.management_groups;

        let span = info_span!("scan", scan_id = %ctx.scan_id);
        pipeline.run(&mut ctx).instrument(span).await?;
        info!(
            scan_id = %ctx.scan_id,
            subscriptions = ctx.subscriptions().len(),
            records = ctx.report.record_count(),
            "scan completed"
        );

        // Step 6: Aggregate
        Ok(ScanResponse {
            report: ReportReadModelBuilder::build(&ctx, request.mask),
            recommendations_loaded,
        })
    }

    /// Loads the plugin directory and keeps the plugins named in `enabled`,
    /// in the order given
    fn select_plugins(&self, enabled: &[String]) -> Result<Vec<PluginDefinition>> {
        if enabled.is_empty() {
            return Ok(Vec::new());
        }

        let available = self.plugin_repository.load_all()?;
        enabled
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|p| p.name == *name)
                    .cloned()
                    .ok_or_else(|| {
                        anyhow::Error::from(AuditError::UnknownPlugin {
                            name: name.clone(),
                            available: if available.is_empty() {
                                "(none)".to_string()
                            } else {
                                available
                                    .iter()
                                    .map(|p| p.name.as_str())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            },
                        })
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
