//! Patch step - updates legacy constant declarations in the player source.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};
use crate::patcher::{patch_file, PatchOutcome};

/// Rewrites `NAME EQU value` declarations to the qualified form newer
/// assemblers require.
///
/// Optional: a failed patch is reported and the build is attempted anyway.
pub struct PatchStep;

impl PatchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PatchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PatchStep {
    fn name(&self) -> &str {
        "Patch"
    }

    fn description(&self) -> &str {
        "Patching assembly source"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.run.patch_enabled {
            return Ok(StepOutcome::Skipped("patching disabled".to_string()));
        }

        let source = ctx.asm_source();
        let outcome = patch_file(&source, &ctx.settings.paths.backup_suffix)?;

        match &outcome {
            PatchOutcome::SourceMissing(path) => {
                ctx.logger
                    .warn(&format!("{} not found, skipping patch", path.display()));
            }
            PatchOutcome::AlreadyPatched => ctx.logger.info("Source already patched"),
            PatchOutcome::NothingToPatch => ctx.logger.info("No declarations needed patching"),
            PatchOutcome::Patched {
                qualified,
                backup_created,
            } => {
                if let Some(backup) = backup_created {
                    ctx.logger
                        .info(&format!("Backup written to {}", backup.display()));
                }
                ctx.logger
                    .success(&format!("Qualified {} declaration(s)", qualified));
            }
        }

        state.patch = Some(outcome);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
        Ok(())
    }

    fn reached(&self, _outcome: &StepOutcome) -> Stage {
        Stage::Patched
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn fallback(&self) -> &str {
        "building with the source as-is"
    }
}
