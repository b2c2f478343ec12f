//! Audio step - extracts the soundtrack as 16-bit stereo PCM.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};

/// Extracts the waveform the build embeds.
///
/// Optional: if extraction fails the ROM is built silent.
pub struct AudioStep;

impl AudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AudioStep {
    fn name(&self) -> &str {
        "Audio"
    }

    fn description(&self) -> &str {
        "Extracting audio"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.run.audio_enabled {
            return Ok(StepOutcome::Skipped("audio disabled".to_string()));
        }

        let extractor = ctx.audio_extractor();
        let output = ctx.sound_path();
        ctx.logger
            .command(&extractor.command(&ctx.run.input, &output).display());

        let audio = extractor.extract(&ctx.run.input, &output)?;
        ctx.logger.success(&format!(
            "Audio written to {} ({} bytes)",
            audio.path.display(),
            audio.size_bytes
        ));
        state.audio = Some(audio);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.sound_for_build().is_none() {
            return Err(StepError::invalid_output("Audio file not recorded"));
        }
        Ok(())
    }

    fn reached(&self, outcome: &StepOutcome) -> Stage {
        match outcome {
            StepOutcome::Success => Stage::AudioExtracted,
            _ => Stage::AudioSkipped,
        }
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn fallback(&self) -> &str {
        "continuing without audio"
    }
}
