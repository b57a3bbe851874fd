use async_trait::async_trait;
use azqr::ports::outbound::{CloudApiError, GraphQuery, GraphRow};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Mock GraphQuery answering by query fragment and capturing every query
///
/// The first registered fragment contained in a query wins; queries that
/// match nothing return no rows.
#[derive(Default, Clone)]
pub struct MockGraphQuery {
    responses: Vec<(String, Result<Vec<GraphRow>, CloudApiError>)>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockGraphQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, fragment: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();
        self.responses.push((fragment.to_string(), Ok(rows)));
        self
    }

    pub fn with_failure(mut self, fragment: &str, error: CloudApiError) -> Self {
        self.responses.push((fragment.to_string(), Err(error)));
        self
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphQuery for MockGraphQuery {
    async fn query(
        &self,
        query: &str,
        _subscriptions: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<GraphRow>, CloudApiError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.responses
            .iter()
            .find(|(fragment, _)| query.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
