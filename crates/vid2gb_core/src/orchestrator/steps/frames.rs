//! Frames step - renders the input video to a grayscale frame sequence.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};

/// Extracts scaled grayscale frames into the repository's frame directory.
pub struct FramesStep;

impl FramesStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FramesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FramesStep {
    fn name(&self) -> &str {
        "Frames"
    }

    fn description(&self) -> &str {
        "Extracting frames"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.run.input.exists() {
            return Err(StepError::file_not_found(ctx.run.input.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let extractor = ctx.frame_extractor();
        let spec = extractor.command(&ctx.run.input, ctx.run.profile, ctx.run.pulldown);
        ctx.logger.command(&spec.display());
        ctx.logger.info(&format!(
            "{} at {} fps",
            ctx.run.profile,
            ctx.run.pulldown.frame_rate()
        ));

        let frames = extractor.extract(&ctx.run.input, ctx.run.profile, ctx.run.pulldown)?;

        ctx.logger.success(&format!(
            "Extracted {} frames to {}",
            frames.count,
            frames.dir.display()
        ));
        state.frames = Some(frames);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.frames {
            Some(frames) if frames.count > 0 => Ok(()),
            _ => Err(StepError::invalid_output("No frames recorded")),
        }
    }

    fn reached(&self, _outcome: &StepOutcome) -> Stage {
        Stage::FramesExtracted
    }
}
