use super::rate_limiter::RateLimiter;
use super::scanner_registry::ScannerRegistry;
use crate::audit::domain::PluginDefinition;
use crate::audit::services::Catalog;
use crate::ports::outbound::{CloudApiError, GraphQuery, GraphRow, ManagementApi, ProgressReporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Collaborators shared by every stage of a run
///
/// Everything here is either immutable (catalog, scanners, plugins) or
/// internally synchronized (limiter, clients, progress reporter).
pub struct ScanServices {
    pub graph: Arc<dyn GraphQuery>,
    pub management: Arc<dyn ManagementApi>,
    pub limiter: Arc<RateLimiter>,
    pub catalog: Arc<Catalog>,
    pub scanners: ScannerRegistry,
    /// Plugins enabled for this run
    pub plugins: Vec<PluginDefinition>,
    pub progress: Arc<dyn ProgressReporter>,
}

impl ScanServices {
    /// Runs one graph query after taking a limiter token
    pub async fn graph_rows(
        &self,
        query: &str,
        subscriptions: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.limiter.acquire(cancel).await?;
        self.graph.query(query, subscriptions, cancel).await
    }

    /// Management-group scoped variant of [`ScanServices::graph_rows`]
    pub async fn graph_rows_for_management_groups(
        &self,
        query: &str,
        management_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.limiter.acquire(cancel).await?;
        self.graph
            .query_management_groups(query, management_groups, cancel)
            .await
    }
}
