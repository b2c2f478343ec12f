//! Pipeline orchestrator for coordinating a conversion.
//!
//! A conversion is a fixed sequence of steps, each of which validates,
//! executes, and records its results in the shared [`RunState`].
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Dependencies  (required)
//!     ├── Step: Patch         (optional)
//!     ├── Step: Frames        (required)
//!     ├── Step: Audio         (optional)
//!     ├── Step: Build         (required)
//!     └── Step: Deliver       (required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vid2gb_core::orchestrator::{create_standard_pipeline, run_conversion, Context};
//!
//! let pipeline = create_standard_pipeline();
//! let ctx = Context::new(run, settings, Arc::new(SystemRunner::new()), logger);
//! let summary = run_conversion(&pipeline, &ctx)?;
//! println!("Wrote {} frames", summary.frame_count());
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
mod scenarios;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AudioStep, BuildStep, DeliverStep, DependenciesStep, FramesStep, PatchStep};
pub use types::{ConversionSummary, Context, RunState, Stage, StepOutcome};

/// Create the standard conversion pipeline.
///
/// Steps run in this order:
/// 1. Dependencies - probe tools and interpreter libraries
/// 2. Patch - qualify legacy constant declarations
/// 3. Frames - extract scaled grayscale frames
/// 4. Audio - extract the soundtrack
/// 5. Build - run the build rules
/// 6. Deliver - copy the ROM to its destination
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(DependenciesStep::new())
        .with_step(PatchStep::new())
        .with_step(FramesStep::new())
        .with_step(AudioStep::new())
        .with_step(BuildStep::new())
        .with_step(DeliverStep::new())
}

/// Run `pipeline` for the conversion described by `ctx`.
pub fn run_conversion(pipeline: &Pipeline, ctx: &Context) -> PipelineResult<ConversionSummary> {
    let mut state = RunState::new();
    if let Some(started) = &state.started_at {
        ctx.logger.debug(&format!("Run started at {}", started));
    }

    let outcome = pipeline.run(ctx, &mut state);
    ctx.logger.flush();

    let steps = outcome?;
    Ok(ConversionSummary { steps, state })
}
