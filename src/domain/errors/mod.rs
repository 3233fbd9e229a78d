// Domain errors - Error types shared by every layer

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::Tool;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No executable candidate was found for the tool
    #[error("{tool} was not found. Install it (for example with your package manager) and enable \"prefer installed tools\", or provide a bundled {tool}.")]
    ToolNotFound { tool: Tool },

    /// The tool ran but exited with a non-zero status
    #[error("{}", command_failed_message(*exit_code, output))]
    CommandFailed { exit_code: i32, output: String },

    /// The probe succeeded but reported no usable duration
    #[error("Could not read input duration.")]
    DurationUnavailable,

    /// The executable could not be launched at all
    #[error("Failed to launch {}: {message}", program.display())]
    SpawnFailed { program: PathBuf, message: String },

    /// Reading the output of, or waiting on, a running process failed
    #[error("I/O error while running {}: {message}", program.display())]
    ProcessIo { program: PathBuf, message: String },

    /// Request rejected before any process was spawned
    #[error("{0}")]
    InvalidRequest(InvalidRequest),

    /// Operation was cancelled by the caller
    #[error("Operation was cancelled.")]
    Cancelled,

    /// Persisted settings could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

fn command_failed_message(exit_code: i32, output: &str) -> String {
    if output.is_empty() {
        format!("ffmpeg failed with exit code {}.", exit_code)
    } else {
        format!("ffmpeg failed with exit code {}: {}", exit_code, output)
    }
}

/// Reasons a cut request is refused locally
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidRequest {
    #[error("Select an input file first.")]
    MissingInput,

    #[error("Select an output file first.")]
    MissingOutput,

    #[error("Output file must be different from input file.")]
    OutputMatchesInput,

    #[error("Start time must be seconds or mm:ss, and >= 0.")]
    BadStartTime,

    #[error("End time must be seconds or mm:ss, and >= 0.")]
    BadEndTime,

    /// End was beyond the known duration and has been pulled back to it
    #[error("End time exceeded file length. End time was reset to video end.")]
    EndClamped { end: f64 },

    #[error("End time must be greater than start time.")]
    EmptyRange,

    /// A range picked on the preview timeline was empty after clamping
    #[error("Invalid trim selection from preview.")]
    InvalidSelection,

    #[error("Canceled: output file was not overwritten.")]
    OverwriteDeclined,

    #[error("Wait for the input to finish loading.")]
    StillLoading,

    #[error("A cut is already running.")]
    CutInProgress,

    #[error("The input changed before the cut could start.")]
    InputChanged,
}

impl From<InvalidRequest> for DomainError {
    fn from(reason: InvalidRequest) -> Self {
        DomainError::InvalidRequest(reason)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
