//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, RunState, Stage, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline calls, in order:
///
/// 1. `validate_input` - check preconditions before execution
/// 2. `execute` - perform the step's work
/// 3. `validate_output` - verify the step produced valid output
///
/// An error from any of these fails the run unless the step is optional,
/// in which case the pipeline records the step as degraded and moves on.
///
/// # Example
///
/// ```ignore
/// struct ProbeStep;
///
/// impl PipelineStep for ProbeStep {
///     fn name(&self) -> &str { "Probe" }
///
///     fn validate_input(&self, _ctx: &Context) -> StepResult<()> { Ok(()) }
///
///     fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
///         state.probe = Some(probe_dependencies(&ctx.settings.tools, ctx.runner.as_ref()));
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> { Ok(()) }
///
///     fn reached(&self, _outcome: &StepOutcome) -> Stage { Stage::DependenciesChecked }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work, recording results in `state`.
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Only called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Stage entered once this step finishes with `outcome`.
    fn reached(&self, outcome: &StepOutcome) -> Stage;

    /// Whether a failure of this step degrades the run instead of failing it.
    fn is_optional(&self) -> bool {
        false
    }

    /// What the run does without this step's output.
    fn fallback(&self) -> &str {
        "continuing"
    }

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
