//! Pipeline step implementations.
//!
//! One step per stage of the conversion, in run order.

mod audio;
mod build;
mod deliver;
mod dependencies;
mod frames;
mod patch;

pub use audio::AudioStep;
pub use build::BuildStep;
pub use deliver::DeliverStep;
pub use dependencies::DependenciesStep;
pub use frames::FramesStep;
pub use patch::PatchStep;
