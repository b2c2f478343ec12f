//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::build::BuildError;
use crate::extraction::ExtractionError;
use crate::patcher::PatchError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The run was rejected before any step started.
    #[error("Run '{run_name}' failed validation: {message}")]
    ValidationFailed { run_name: String, message: String },

    /// Pipeline was cancelled.
    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Name of the failing step, if a step failed.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step_name, .. } => Some(step_name),
            _ => None,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// One or more required tools or libraries are unavailable.
    #[error("Missing required dependencies:\n{0}")]
    MissingDependencies(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl StepError {
    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
