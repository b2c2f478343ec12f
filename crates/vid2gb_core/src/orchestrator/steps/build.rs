//! Build step - runs the repository's build rules to produce the ROM.

use crate::build::BuildRequest;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};

/// Invokes the build tool with the run's configuration.
///
/// The sound parameter is only passed when audio was extracted in this run
/// and the file is still present.
pub struct BuildStep;

impl BuildStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BuildStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for BuildStep {
    fn name(&self) -> &str {
        "Build"
    }

    fn description(&self) -> &str {
        "Building ROM"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        ctx.build_invoker().ensure_build_file()?;
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        // The build tool runs inside the repository, so the sound path must
        // not be relative to our working directory.
        let sound = state
            .sound_for_build()
            .map(|p| std::path::absolute(&p))
            .transpose()
            .map_err(|e| StepError::io_error("resolving sound path", e))?;

        let request = BuildRequest {
            profile: ctx.run.profile,
            pulldown: ctx.run.pulldown,
            frame_extension: ctx.settings.frames.extension.clone(),
            sound,
        };

        let invoker = ctx.build_invoker();
        ctx.logger.command(&invoker.command(&request).display());

        let rom = invoker.build(&request)?;
        ctx.logger.tool_output(&ctx.settings.tools.build_tool, &rom.log);
        if !rom.with_audio {
            ctx.logger.info("Building without audio");
        }
        ctx.logger
            .success(&format!("Build produced {}", rom.path.display()));
        state.rom = Some(rom);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.rom {
            Some(rom) if rom.path.exists() => Ok(()),
            Some(rom) => Err(StepError::file_not_found(rom.path.display().to_string())),
            None => Err(StepError::invalid_output("ROM not recorded")),
        }
    }

    fn reached(&self, _outcome: &StepOutcome) -> Stage {
        Stage::Built
    }
}
