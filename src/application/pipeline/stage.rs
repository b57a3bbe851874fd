use crate::application::scan_context::ScanContext;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Work performed by one stage against the shared context
#[async_trait]
pub trait StageAction: Send + Sync {
    /// Runs the stage.
    ///
    /// # Errors
    /// Any error aborts the pipeline; stages that tolerate partial failure
    /// log and swallow it themselves.
    async fn run(&self, ctx: &mut ScanContext) -> Result<()>;
}

/// A named unit of work with its upstream dependencies
pub struct Stage {
    pub name: String,
    pub dependencies: Vec<String>,
    pub enabled: bool,
    pub action: Box<dyn StageAction>,
}

impl Stage {
    pub fn new(name: impl Into<String>, action: impl StageAction + 'static) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            enabled: true,
            action: Box::new(action),
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Timing and volume recorded for one executed stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageMetrics {
    pub elapsed: Duration,
    /// Records the stage added to the report
    pub records: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
