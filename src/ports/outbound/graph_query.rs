use super::CloudApiError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// One decoded result row: column name to untyped value
pub type GraphRow = Map<String, Value>;

/// GraphQuery port for the fleet-wide resource graph
///
/// Implementations hide pagination and transient-failure retries; callers
/// receive every page concatenated in provider order. Rate limiting is the
/// caller's concern (see `RateLimiter`).
#[async_trait]
pub trait GraphQuery: Send + Sync {
    /// Runs `query` across `subscriptions`
    ///
    /// # Arguments
    /// * `query` - Query text
    /// * `subscriptions` - Subscription ids to scope the query to
    /// * `cancel` - Aborts the call at the next I/O point
    ///
    /// # Errors
    /// Returns an error if:
    /// - Retries are exhausted on a transient failure
    /// - The provider rejects the request
    /// - The call is cancelled
    async fn query(
        &self,
        query: &str,
        subscriptions: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError>;

    /// Runs `query` scoped to management groups instead of subscriptions
    async fn query_management_groups(
        &self,
        _query: &str,
        _management_groups: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        Err(CloudApiError::Unsupported(
            "management group scoped queries".to_string(),
        ))
    }
}
