//! Sequential execution of stages with per-stage isolation.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, warn};

use super::context::ArrivalsContext;
use super::stage::{Stage, StageStatus};

/// Default time a single stage may take.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// How one stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    Skipped(&'static str),
    Failed(String),
    TimedOut,
    Panicked,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: &'static str,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Outcome of every stage, in execution order.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    /// Whether every stage completed or skipped itself.
    pub fn is_clean(&self) -> bool {
        self.stages
            .iter()
            .all(|r| matches!(r.outcome, StageOutcome::Completed | StageOutcome::Skipped(_)))
    }
}

/// An ordered chain of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    stage_timeout: Duration,
}

impl Pipeline {
    pub fn new(stage_timeout: Duration) -> Self {
        Self {
            stages: Vec::new(),
            stage_timeout,
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order.
    ///
    /// A stage that fails, panics or exceeds the timeout is logged and the
    /// next stage runs against the context as it stood.
    pub async fn run(&self, ctx: &mut ArrivalsContext) -> PipelineReport {
        let mut report = PipelineReport::default();

        for stage in &self.stages {
            let name = stage.name();
            let started = Instant::now();

            let result = tokio::time::timeout(
                self.stage_timeout,
                AssertUnwindSafe(stage.process(ctx)).catch_unwind(),
            )
            .await;

            let elapsed = started.elapsed();
            let outcome = match result {
                Ok(Ok(Ok(StageStatus::Applied))) => StageOutcome::Completed,
                Ok(Ok(Ok(StageStatus::Skipped(reason)))) => StageOutcome::Skipped(reason),
                Ok(Ok(Err(e))) => {
                    warn!(stage = name, stop_id = %ctx.stop_id, error = %e, "stage failed");
                    StageOutcome::Failed(e.to_string())
                }
                Ok(Err(_)) => {
                    warn!(stage = name, stop_id = %ctx.stop_id, "stage panicked");
                    StageOutcome::Panicked
                }
                Err(_) => {
                    warn!(
                        stage = name,
                        stop_id = %ctx.stop_id,
                        timeout_ms = self.stage_timeout.as_millis() as u64,
                        "stage timed out"
                    );
                    StageOutcome::TimedOut
                }
            };

            debug!(
                stage = name,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                arrivals = ctx.arrivals.len(),
                outcome = ?outcome,
                "stage finished"
            );
            report.stages.push(StageReport {
                stage: name,
                outcome,
                elapsed,
            });
        }

        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DEFAULT_STAGE_TIMEOUT)
    }
}
