use super::{PipelineError, Stage, StageMetrics};
use crate::application::scan_context::ScanContext;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};

/// Ordered, validated stages ready to run
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub(super) fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs the enabled stages one after another
    ///
    /// A stage whose dependency was disabled or skipped is itself skipped.
    /// Metrics for each executed stage are written to `ctx.metrics`.
    ///
    /// # Errors
    /// `PipelineError::Cancelled` when `ctx.cancel` fires before or during a
    /// stage, `PipelineError::StageFailed` for the first failing stage.
    pub async fn run(&self, ctx: &mut ScanContext) -> Result<(), PipelineError> {
        let mut skipped: HashSet<&str> = HashSet::new();

        for stage in &self.stages {
            if ctx.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled {
                    stage: stage.name.clone(),
                });
            }
            if !stage.enabled {
                skipped.insert(stage.name.as_str());
                continue;
            }
            if let Some(missing) = stage
                .dependencies
                .iter()
                .find(|d| skipped.contains(d.as_str()))
            {
                warn!(stage = %stage.name, dependency = %missing, "skipping stage, dependency did not run");
                skipped.insert(stage.name.as_str());
                continue;
            }

            info!(stage = %stage.name, "stage started");
            let records_before = ctx.report.record_count();
            let started_at = Utc::now();
            let clock = Instant::now();
            let outcome = stage.action.run(ctx).await;
            let elapsed = clock.elapsed();
            let records = ctx.report.record_count().saturating_sub(records_before);

            let metrics = StageMetrics {
                elapsed,
                records,
                error: outcome.as_ref().err().map(|e| format!("{:#}", e)),
                started_at,
                finished_at: Utc::now(),
            };
            ctx.metrics.insert(stage.name.clone(), metrics);

            match outcome {
                Ok(()) => {
                    info!(stage = %stage.name, ?elapsed, records, "stage finished");
                }
                Err(_) if ctx.cancel.is_cancelled() => {
                    return Err(PipelineError::Cancelled {
                        stage: stage.name.clone(),
                    });
                }
                Err(e) => {
                    warn!(stage = %stage.name, ?elapsed, error = %e, "stage failed");
                    return Err(PipelineError::StageFailed {
                        stage: stage.name.clone(),
                        elapsed,
                        metrics: ctx.metrics.clone(),
                        source: e.into(),
                    });
                }
            }
        }
        Ok(())
    }
}
