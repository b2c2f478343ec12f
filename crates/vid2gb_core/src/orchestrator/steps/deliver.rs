//! Deliver step - copies the built ROM to the requested output path.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};

pub struct DeliverStep;

impl DeliverStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeliverStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DeliverStep {
    fn name(&self) -> &str {
        "Deliver"
    }

    fn description(&self) -> &str {
        "Copying ROM to output"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if state.rom.is_none() {
            return Err(StepError::precondition_failed("No ROM has been built"));
        }

        let delivered = ctx.build_invoker().deliver(&ctx.run.output)?;
        ctx.logger.success(&format!(
            "ROM created: {} ({:.2} MB)",
            delivered.path.display(),
            delivered.size_mib()
        ));
        state.delivered = Some(delivered);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.run.output.exists() {
            return Err(StepError::file_not_found(ctx.run.output.display().to_string()));
        }
        Ok(())
    }

    fn reached(&self, _outcome: &StepOutcome) -> Stage {
        Stage::Done
    }
}
