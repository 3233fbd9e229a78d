// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::errors::{DomainResult, InvalidRequest};
use crate::utils::path::default_output_path;
use crate::utils::time::{format_seconds, parse_time};

/// External tools the engine delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    /// Executable file name, without any platform suffix
    pub fn executable_name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable_name())
    }
}

/// Where executables are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPolicy {
    /// Conventional install directories, then the search path
    Installed,
    /// The application's own resource directory
    Bundled,
}

impl ToolPolicy {
    /// Map the persisted "prefer installed tools" flag onto a policy
    pub fn from_preference(prefer_installed: bool) -> Self {
        if prefer_installed {
            ToolPolicy::Installed
        } else {
            ToolPolicy::Bundled
        }
    }
}

/// An executable path for one tool, resolved for a single operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTool {
    pub tool: Tool,
    pub path: PathBuf,
}

/// Exit code and combined stdout/stderr of one subprocess run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub output: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output with surrounding whitespace and newlines removed
    pub fn trimmed_output(&self) -> &str {
        self.output.trim()
    }
}

/// A requested trim range in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRequest {
    pub start: f64,
    pub end: f64,
}

impl TrimRequest {
    /// Parse start and end text, each either seconds or `minutes:seconds`
    pub fn parse(start_text: &str, end_text: &str) -> DomainResult<Self> {
        let start = parse_time(start_text).ok_or(InvalidRequest::BadStartTime)?;
        let end = parse_time(end_text).ok_or(InvalidRequest::BadEndTime)?;
        Ok(Self { start, end })
    }

    /// Only a non-empty range can be cut
    pub fn is_executable(&self) -> bool {
        self.end > self.start
    }
}

/// Achievable cut boundaries predicted from packet timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutPrediction {
    pub requested_start: f64,
    pub requested_end: f64,
    pub predicted_start: f64,
    pub predicted_end: f64,
    pub frame_rate: Option<f64>,
}

impl CutPrediction {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Requested {}s -> {}s | Predicted {}s -> {}s",
            format_seconds(self.requested_start),
            format_seconds(self.requested_end),
            format_seconds(self.predicted_start),
            format_seconds(self.predicted_end),
        );

        if let Some(fps) = self.frame_rate.filter(|fps| *fps > 0.0) {
            let start_frame = (self.predicted_start * fps).round() as i64;
            let end_frame = (self.predicted_end * fps).round() as i64;
            line.push_str(&format!(
                " (frames ~{}-{} @ {:.3}fps)",
                start_frame, end_frame, fps
            ));
        }
        line
    }
}

impl fmt::Display for CutPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// The currently selected input and everything derived from it.
///
/// The input path is the identity key: results computed for another path are stale.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub duration: Option<f64>,
    pub start_text: String,
    pub end_text: String,
    pub prediction: Option<CutPrediction>,
}

impl MediaSource {
    /// Fresh source with the default output path and a reset range
    pub fn new(input_path: PathBuf) -> Self {
        let output_path = Some(default_output_path(&input_path));
        Self {
            input_path,
            output_path,
            duration: None,
            start_text: "0".to_string(),
            end_text: String::new(),
            prediction: None,
        }
    }

    pub fn is_input(&self, path: &Path) -> bool {
        self.input_path == path
    }
}

/// A fully validated cut, ready to hand to the cutter
#[derive(Debug, Clone, PartialEq)]
pub struct CutPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: f64,
    pub end: f64,
}

impl CutPlan {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Arguments of one stream-copy invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CutJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: f64,
    pub duration: f64,
    pub overwrite: bool,
}

impl CutJob {
    pub fn from_plan(plan: &CutPlan, overwrite: bool) -> Self {
        Self {
            input: plan.input.clone(),
            output: plan.output.clone(),
            start: plan.start,
            duration: plan.duration(),
            overwrite,
        }
    }
}

/// Severity attached to a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// User-facing status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Controller state machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading(PathBuf),
    Ready(PathBuf),
    Running(PathBuf),
}

#[cfg(test)]
mod tests;
