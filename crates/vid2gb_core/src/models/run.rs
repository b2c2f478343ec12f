//! The transient aggregate describing one conversion.

use std::io;
use std::path::{self, Path, PathBuf};

use super::profile::{Pulldown, ResolutionProfile};

/// Parameters of a single conversion run.
///
/// Created at invocation start and threaded through every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Source video.
    pub input: PathBuf,
    /// Where the finished ROM is copied.
    pub output: PathBuf,
    /// Root of the player repository (holds the build rules).
    pub repo_root: PathBuf,
    pub profile: ResolutionProfile,
    pub pulldown: Pulldown,
    /// Extract and embed an audio track.
    pub audio_enabled: bool,
    /// Apply the assembler syntax patch before building.
    pub patch_enabled: bool,
}

impl PipelineRun {
    /// Create a run with default profile, timing, audio on and patching on.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        repo_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            repo_root: repo_root.into(),
            profile: ResolutionProfile::default(),
            pulldown: Pulldown::default(),
            audio_enabled: true,
            patch_enabled: true,
        }
    }

    pub fn with_profile(mut self, profile: ResolutionProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_pulldown(mut self, pulldown: Pulldown) -> Self {
        self.pulldown = pulldown;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    pub fn with_patch(mut self, enabled: bool) -> Self {
        self.patch_enabled = enabled;
        self
    }

    /// Make every path absolute against the current directory.
    ///
    /// The build tool runs inside the repository root, so any path handed
    /// to it must not depend on the caller's working directory.
    pub fn resolved(mut self) -> io::Result<Self> {
        self.input = path::absolute(&self.input)?;
        self.output = path::absolute(&self.output)?;
        self.repo_root = path::absolute(&self.repo_root)?;
        Ok(self)
    }

    /// Short label for log and error context (input file name).
    pub fn label(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.display().to_string())
    }

    /// Resolve a repository-relative path.
    pub fn repo_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.repo_root.join(relative)
    }
}
