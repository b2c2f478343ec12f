//! Pipeline runner that executes steps in sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::{PipelineError, PipelineResult, StepResult};
use super::step::PipelineStep;
use super::types::{Context, RunState, Stage, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Steps run strictly in order. Each step advances the run's [`Stage`];
/// a failing required step moves it to `Failed` and stops the run, while a
/// failing optional step is recorded as degraded.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Get a cancellation handle.
    ///
    /// Call `cancel()` on the returned handle to stop the pipeline
    /// at the next step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Check if pipeline has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the pipeline with the given context and state.
    ///
    /// The run is validated first; nothing is spawned for a run that fails
    /// validation. Then, for each step:
    /// 1. Check for cancellation
    /// 2. Run `validate_input`
    /// 3. Run `execute`
    /// 4. Run `validate_output` (if execute returned Success)
    pub fn run(&self, ctx: &Context, state: &mut RunState) -> PipelineResult<PipelineRunResult> {
        let run_name = ctx.run_name();

        if let Err(e) = ctx.validate() {
            ctx.logger.error(&e.to_string());
            state.fail();
            return Err(e);
        }

        let mut result = PipelineRunResult::default();
        let total_steps = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            if self.is_cancelled() {
                ctx.logger
                    .warn(&format!("Cancelled before step '{}'", step.name()));
                state.fail();
                return Err(PipelineError::cancelled(&run_name));
            }

            let step_name = step.name();
            ctx.logger.phase(&format!(
                "[{}/{}] {}",
                i + 1,
                total_steps,
                step.description()
            ));

            let outcome = match self.run_step(step.as_ref(), ctx, state) {
                Ok(outcome) => outcome,
                Err(_) if self.is_cancelled() => {
                    ctx.logger
                        .warn(&format!("Cancelled during step '{}'", step_name));
                    state.fail();
                    return Err(PipelineError::cancelled(&run_name));
                }
                Err(e) if step.is_optional() => {
                    let warning = format!("{} failed: {}", step_name, e);
                    ctx.logger
                        .warn(&format!("{}; {}", warning, step.fallback()));
                    state.warnings.push(warning);
                    StepOutcome::Degraded(e.to_string())
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", step_name, e));
                    state.fail();
                    return Err(PipelineError::step_failed(&run_name, step_name, e));
                }
            };

            match &outcome {
                StepOutcome::Success => result.steps_completed.push(step_name.to_string()),
                StepOutcome::Skipped(reason) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
                StepOutcome::Degraded(_) => result.steps_degraded.push(step_name.to_string()),
            }

            state.advance(step.reached(&outcome));
            ctx.logger.debug(&format!("Stage: {}", state.stage));
        }

        result.final_stage = state.stage;

        Ok(result)
    }

    fn run_step(
        &self,
        step: &dyn PipelineStep,
        ctx: &Context,
        state: &mut RunState,
    ) -> StepResult<StepOutcome> {
        ctx.logger
            .debug(&format!("Validating input for '{}'", step.name()));
        step.validate_input(ctx)?;

        let outcome = step.execute(ctx, state)?;

        if outcome == StepOutcome::Success {
            ctx.logger
                .debug(&format!("Validating output for '{}'", step.name()));
            step.validate_output(ctx, state)?;
        }

        Ok(outcome)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Cancel the pipeline.
    ///
    /// The pipeline stops at the next step boundary. A step that fails
    /// after cancellation was requested is reported as cancelled.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
    /// Optional steps that failed without failing the run.
    pub steps_degraded: Vec<String>,
    /// Stage the run ended in.
    pub final_stage: Stage,
}

impl PipelineRunResult {
    /// True when every step ran and none degraded.
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty() && self.steps_degraded.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len() + self.steps_degraded.len()
    }
}
