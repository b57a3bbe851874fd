//! Stage DAG: registration, validation, ordering and sequential execution.

mod builder;
mod error;
mod runner;
mod stage;

pub use builder::{PipelineBuilder, PipelinePreset};
pub use error::PipelineError;
pub use runner::Pipeline;
pub use stage::{Stage, StageAction, StageMetrics};
