use super::StageMetrics;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Construction and execution failures of the stage pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stage '{0}' is registered twice")]
    DuplicateStage(String),

    #[error("Stage '{stage}' depends on unknown stage '{dependency}'")]
    UnknownDependency { stage: String, dependency: String },

    #[error("Stage dependencies form a cycle through: {}", stages.join(", "))]
    Cycle { stages: Vec<String> },

    #[error("The graph-scan stage cannot be disabled in the default preset\n\n💡 Hint: Use --plugin-only to run plugins without the catalog scan")]
    GraphStageDisabled,

    #[error("Unknown stage '{name}'\n\n💡 Hint: Known stages are: {}", known.join(", "))]
    UnknownStage { name: String, known: Vec<String> },

    #[error("Stage '{stage}' failed after {elapsed:?}: {source}")]
    StageFailed {
        stage: String,
        elapsed: Duration,
        /// Metrics of every stage that ran, the failed one included
        metrics: BTreeMap<String, StageMetrics>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Scan cancelled during stage '{stage}'")]
    Cancelled { stage: String },
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}
