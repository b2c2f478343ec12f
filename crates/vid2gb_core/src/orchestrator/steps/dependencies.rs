//! Dependencies step - verifies every required tool and library is present.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage, StepOutcome};
use crate::toolchain::probe_dependencies;

/// Probes the executables and interpreter libraries the conversion needs.
///
/// Every dependency is checked before the step reports, so a failure
/// names all of the missing ones at once.
pub struct DependenciesStep;

impl DependenciesStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DependenciesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DependenciesStep {
    fn name(&self) -> &str {
        "Dependencies"
    }

    fn description(&self) -> &str {
        "Checking dependencies"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let report = probe_dependencies(&ctx.settings.tools, ctx.runner.as_ref());

        for (name, path) in &report.found {
            ctx.logger
                .debug(&format!("Found {} at {}", name, path.display()));
        }
        for library in &report.libraries {
            ctx.logger.debug(&format!("Found library {}", library));
        }

        if !report.passed() {
            let missing = report.render_missing();
            state.probe = Some(report);
            return Err(StepError::MissingDependencies(missing));
        }

        ctx.logger.success("All dependencies found");
        state.probe = Some(report);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.probe {
            Some(report) if report.passed() => Ok(()),
            _ => Err(StepError::invalid_output("Dependency report not recorded")),
        }
    }

    fn reached(&self, _outcome: &StepOutcome) -> Stage {
        Stage::DependenciesChecked
    }
}
