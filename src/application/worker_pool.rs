use super::rate_limiter::RateLimiter;
use crate::audit::domain::resource::{string_field, value_to_string};
use crate::audit::domain::resource_id::{
    resource_group_from_resource_id, resource_name_from_resource_id, subscription_from_resource_id,
};
use crate::audit::domain::{Recommendation, RecommendationResult};
use crate::ports::outbound::{CloudApiError, GraphQuery, GraphRow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Number of concurrent graph workers; matches the limiter's initial burst
pub const DEFAULT_WORKERS: usize = 10;

/// Where dispatched rules run and how their rows are labelled
#[derive(Debug, Clone, Default)]
pub struct DispatchScope {
    pub subscriptions: Vec<String>,
    /// Lower-cased subscription id to display name
    pub subscription_names: HashMap<String, String>,
}

/// Everything one rule produced
#[derive(Debug)]
pub struct RuleBatch {
    pub recommendation_id: String,
    /// Results in provider row order
    pub results: Vec<RecommendationResult>,
    pub rows_returned: usize,
    /// Permanent or exhausted failure; the batch is then empty
    pub error: Option<CloudApiError>,
}

/// Fixed-width pool that runs graph rules under the shared rate limiter
///
/// Jobs are pre-loaded into a channel sized to the rule count and the
/// sender is dropped, so workers exit once the channel is drained. The
/// result channel closes when the last worker exits, which releases the
/// collector.
pub struct WorkerPool {
    graph: Arc<dyn GraphQuery>,
    limiter: Arc<RateLimiter>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(graph: Arc<dyn GraphQuery>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            graph,
            limiter,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Dispatches every rule and waits for all of them
    ///
    /// # Returns
    /// One batch per rule, in completion order
    ///
    /// # Errors
    /// Returns `CloudApiError::Cancelled` when `cancel` fires; queued jobs
    /// are discarded and in-flight queries unwind at their next I/O point.
    pub async fn dispatch(
        &self,
        rules: Vec<Recommendation>,
        scope: Arc<DispatchScope>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RuleBatch>, CloudApiError> {
        if rules.is_empty() {
            return Ok(Vec::new());
        }
        let job_count = rules.len();

        let (job_tx, job_rx) = mpsc::channel::<Recommendation>(job_count);
        for rule in rules {
            job_tx
                .try_send(rule)
                .map_err(|e| CloudApiError::Unsupported(format!("job channel rejected a rule: {}", e)))?;
        }
        drop(job_tx);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let (result_tx, mut result_rx) = mpsc::channel::<RuleBatch>(job_count);
        let mut workers = JoinSet::new();
        for worker in 0..self.workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let graph = Arc::clone(&self.graph);
            let limiter = Arc::clone(&self.limiter);
            let scope = Arc::clone(&scope);
            let cancel = cancel.clone();

            workers.spawn(async move {
                loop {
                    let next = {
                        let mut rx = job_rx.lock().await;
                        tokio::select! {
                            _ = cancel.cancelled() => None,
                            job = rx.recv() => job,
                        }
                    };
                    let Some(rule) = next else {
                        break;
                    };
                    debug!(worker, rule = %rule.id, "dispatching rule");
                    let batch = run_rule(&rule, graph.as_ref(), &limiter, &scope, &cancel).await;
                    if result_tx.send(batch).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut batches = Vec::with_capacity(job_count);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    workers.abort_all();
                    return Err(CloudApiError::Cancelled);
                }
                batch = result_rx.recv() => match batch {
                    Some(batch) => batches.push(batch),
                    None => break,
                },
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "graph worker terminated abnormally");
            }
        }
        Ok(batches)
    }
}

async fn run_rule(
    rule: &Recommendation,
    graph: &dyn GraphQuery,
    limiter: &RateLimiter,
    scope: &DispatchScope,
    cancel: &CancellationToken,
) -> RuleBatch {
    let mut batch = RuleBatch {
        recommendation_id: rule.id.clone(),
        results: Vec::new(),
        rows_returned: 0,
        error: None,
    };
    let Some(query) = rule.query() else {
        return batch;
    };

    if let Err(e) = limiter.acquire(cancel).await {
        batch.error = Some(e);
        return batch;
    }

    match graph.query(query, &scope.subscriptions, cancel).await {
        Ok(rows) => {
            batch.rows_returned = rows.len();
            batch.results = rows
                .iter()
                .filter_map(|row| result_from_row(rule, row, scope))
                .collect();
        }
        Err(e) => {
            if !e.is_cancelled() {
                warn!(rule = %rule.id, error = %e, "graph rule failed, no results recorded");
            }
            batch.error = Some(e);
        }
    }
    batch
}

/// Maps one query row to a result; rows without `id` are skipped
fn result_from_row(
    rule: &Recommendation,
    row: &GraphRow,
    scope: &DispatchScope,
) -> Option<RecommendationResult> {
    let resource_id = string_field(row, "id");
    if resource_id.is_empty() {
        warn!(rule = %rule.id, "graph row without id, skipping");
        return None;
    }

    let mut result = RecommendationResult::for_recommendation(rule, &resource_id);
    let row_type = string_field(row, "type");
    if !row_type.is_empty() {
        result.resource_type = row_type.to_lowercase();
    }
    result.subscription_id = subscription_from_resource_id(&resource_id);
    result.subscription_name = scope
        .subscription_names
        .get(&result.subscription_id.to_lowercase())
        .cloned()
        .unwrap_or_default();
    result.resource_group = resource_group_from_resource_id(&resource_id);
    result.resource_name = match string_field(row, "name") {
        name if name.is_empty() => resource_name_from_resource_id(&resource_id),
        name => name,
    };
    result.tags = row.get("tags").map(value_to_string).unwrap_or_default();
    for (slot, param) in result.params.iter_mut().enumerate() {
        *param = string_field(row, &format!("param{}", slot + 1));
    }
    Some(result)
}
