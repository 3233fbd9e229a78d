//! TrimKit Library
//!
//! Keyframe-aware lossless trimming on top of external ffmpeg/ffprobe
//! executables: tool resolution, subprocess execution, duration probing,
//! cut-point prediction and the [`TrimSession`] controller that coordinates
//! them against rapidly changing user input.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::session::{SessionSnapshot, SessionTiming, TrimSession};
pub use domain::errors::{DomainError, DomainResult, InvalidRequest};
pub use domain::model::{CutPrediction, MediaSource, SessionPhase, Tool, ToolPolicy};
