//! Audio extraction.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::{ExtractedAudio, ExtractionError, ExtractionResult};
use crate::io::{CommandRunner, CommandSpec};

/// 16-bit little-endian linear PCM.
pub const AUDIO_CODEC: &str = "pcm_s16le";

/// Sample rate the audio encoder expects.
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;

/// Stereo.
pub const AUDIO_CHANNELS: u32 = 2;

/// Extracts the fixed-format waveform the audio encoder consumes.
pub struct AudioExtractor<'a> {
    runner: &'a dyn CommandRunner,
    transcoder: String,
}

impl<'a> AudioExtractor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, transcoder: impl Into<String>) -> Self {
        Self {
            runner,
            transcoder: transcoder.into(),
        }
    }

    /// Full transcoder command; `-y` overwrites any existing output.
    pub fn command(&self, input: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.transcoder)
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .args(["-acodec", AUDIO_CODEC])
            .arg("-ar")
            .arg(AUDIO_SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg(AUDIO_CHANNELS.to_string())
            .arg("-y")
            .arg(output)
    }

    /// Extract the audio track of `input` to `output`.
    pub fn extract(&self, input: &Path, output: &Path) -> ExtractionResult<ExtractedAudio> {
        if !input.exists() {
            return Err(ExtractionError::FileNotFound(input.to_path_buf()));
        }

        let spec = self.command(input, output);
        let result = self
            .runner
            .run(&spec)
            .map_err(|e| ExtractionError::Spawn {
                tool: self.transcoder.clone(),
                source: e,
            })?;

        if !result.success() {
            return Err(ExtractionError::CommandFailed {
                tool: self.transcoder.clone(),
                exit_code: result.code(),
                message: result.stderr,
            });
        }

        let size_bytes = fs::metadata(output)
            .map(|m| m.len())
            .map_err(|_| ExtractionError::OutputMissing(output.to_path_buf()))?;
        if size_bytes == 0 {
            return Err(ExtractionError::OutputMissing(output.to_path_buf()));
        }

        tracing::info!("Extracted audio to {} ({} bytes)", output.display(), size_bytes);

        Ok(ExtractedAudio {
            path: PathBuf::from(output),
            size_bytes,
        })
    }
}
