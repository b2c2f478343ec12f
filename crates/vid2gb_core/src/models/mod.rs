//! Data models shared across the pipeline.

mod profile;
mod run;

pub use profile::{Pulldown, PulldownError, ResolutionProfile, BASE_FRAME_RATE};
pub use run::PipelineRun;
