//! Frame extraction.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::{ExtractionError, ExtractionResult, FrameSet};
use crate::io::{CommandRunner, CommandSpec};
use crate::models::{Pulldown, ResolutionProfile};

/// Extracts a numbered greyscale frame sequence from a video.
pub struct FrameExtractor<'a> {
    runner: &'a dyn CommandRunner,
    transcoder: String,
    frames_dir: PathBuf,
    extension: String,
    scale_filter: String,
}

impl<'a> FrameExtractor<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        transcoder: impl Into<String>,
        frames_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            transcoder: transcoder.into(),
            frames_dir: frames_dir.into(),
            extension: "bmp".to_string(),
            scale_filter: "lanczos".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_scale_filter(mut self, filter: impl Into<String>) -> Self {
        self.scale_filter = filter.into();
        self
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    /// Video filter chain: rate, then scale, then greyscale.
    pub fn filter_chain(&self, profile: ResolutionProfile, pulldown: Pulldown) -> String {
        let (width, height) = profile.dimensions();
        format!(
            "fps={:?},scale={}:{}:flags={},format=gray",
            pulldown.frame_rate(),
            width,
            height,
            self.scale_filter
        )
    }

    /// Full transcoder command for `input`.
    pub fn command(&self, input: &Path, profile: ResolutionProfile, pulldown: Pulldown) -> CommandSpec {
        let pattern = self.frames_dir.join(format!("%d.{}", self.extension));
        CommandSpec::new(&self.transcoder)
            .arg("-i")
            .arg(input)
            .arg("-vf")
            .arg(self.filter_chain(profile, pulldown))
            .args(["-pix_fmt", "gray"])
            .arg(pattern)
    }

    /// Reset the frame directory and extract frames from `input`.
    ///
    /// The directory is removed and recreated first so no frames from an
    /// earlier run survive. On a non-zero exit the transcoder's stderr is
    /// returned verbatim.
    pub fn extract(
        &self,
        input: &Path,
        profile: ResolutionProfile,
        pulldown: Pulldown,
    ) -> ExtractionResult<FrameSet> {
        if !input.exists() {
            return Err(ExtractionError::FileNotFound(input.to_path_buf()));
        }

        self.reset_dir()?;

        let spec = self.command(input, profile, pulldown);
        let output = self
            .runner
            .run(&spec)
            .map_err(|e| ExtractionError::Spawn {
                tool: self.transcoder.clone(),
                source: e,
            })?;

        if !output.success() {
            return Err(ExtractionError::CommandFailed {
                tool: self.transcoder.clone(),
                exit_code: output.code(),
                message: output.stderr,
            });
        }

        let count = count_frames(&self.frames_dir, &self.extension)
            .map_err(|e| ExtractionError::io("counting frames", e))?;
        if count == 0 {
            return Err(ExtractionError::OutputMissing(self.frames_dir.clone()));
        }

        let (width, height) = profile.dimensions();
        tracing::info!(
            "Extracted {} frames at {}x{} ({:.1} fps)",
            count,
            width,
            height,
            pulldown.frame_rate()
        );

        Ok(FrameSet {
            dir: self.frames_dir.clone(),
            count,
            width,
            height,
            fps: pulldown.frame_rate(),
            extension: self.extension.clone(),
        })
    }

    fn reset_dir(&self) -> ExtractionResult<()> {
        if self.frames_dir.exists() {
            fs::remove_dir_all(&self.frames_dir)
                .map_err(|e| ExtractionError::io("clearing frame directory", e))?;
        }
        fs::create_dir_all(&self.frames_dir)
            .map_err(|e| ExtractionError::io("creating frame directory", e))
    }
}

/// Count files in `dir` with the given extension.
pub fn count_frames(dir: &Path, extension: &str) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == extension) {
            count += 1;
        }
    }
    Ok(count)
}
