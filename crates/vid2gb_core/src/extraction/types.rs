//! Types for extraction operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for extraction operations.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Input file not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The transcoder could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The transcoder exited unsuccessfully; `message` is its stderr.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// Expected output missing or empty after extraction.
    #[error("Output missing or empty: {}", .0.display())]
    OutputMissing(PathBuf),

    /// Filesystem error while preparing or inspecting output.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ExtractionError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Numbered frame sequence produced by the frame extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    pub dir: PathBuf,
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Image extension of every frame file.
    pub extension: String,
}

/// Waveform produced by the audio extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAudio {
    pub path: PathBuf,
    pub size_bytes: u64,
}
