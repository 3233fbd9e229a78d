//! FFprobe adapters
//!
//! Duration probing and packet-based cut prediction. Parsing and the
//! boundary mapping itself live in [`crate::domain::rules`].

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::tool_resolver::ExecutableResolver;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{
    parse_duration_output, parse_frame_rate, parse_packet_times, predict_boundaries,
};
use crate::ports::*;

fn ffprobe_args(parts: &[&str], input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = parts.iter().map(OsString::from).collect();
    args.push(input.as_os_str().to_os_string());
    args
}

/// `ffprobe` arguments printing the container duration as a bare number
pub fn duration_args(input: &Path) -> Vec<OsString> {
    ffprobe_args(
        &[
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ],
        input,
    )
}

/// `ffprobe` arguments listing first-video-stream packet timestamps as CSV
pub fn packet_time_args(input: &Path) -> Vec<OsString> {
    ffprobe_args(
        &[
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "packet=pts_time",
            "-of",
            "csv=p=0",
        ],
        input,
    )
}

/// `ffprobe` arguments printing the average frame rate of the first video stream
pub fn frame_rate_args(input: &Path) -> Vec<OsString> {
    ffprobe_args(
        &[
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=avg_frame_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ],
        input,
    )
}

/// Reads a media file's total duration
#[derive(Clone)]
pub struct DurationProbe {
    resolver: Arc<ExecutableResolver>,
    runner: Arc<dyn ProcessPort>,
}

impl DurationProbe {
    pub fn new(resolver: Arc<ExecutableResolver>, runner: Arc<dyn ProcessPort>) -> Self {
        Self { resolver, runner }
    }

    pub async fn probe(&self, input: &Path, policy: ToolPolicy) -> DomainResult<f64> {
        let ffprobe = self.resolver.resolve(Tool::Ffprobe, policy)?;
        let result = self.runner.run(&ffprobe.path, &duration_args(input)).await?;
        let duration = parse_duration_output(&result)?;
        debug!(input = %input.display(), duration, "Probed duration");
        Ok(duration)
    }
}

/// Predicts the boundaries a stream-copy cut will actually land on
#[derive(Clone)]
pub struct CutPredictor {
    resolver: Arc<ExecutableResolver>,
    runner: Arc<dyn ProcessPort>,
}

impl CutPredictor {
    pub fn new(resolver: Arc<ExecutableResolver>, runner: Arc<dyn ProcessPort>) -> Self {
        Self { resolver, runner }
    }

    /// List packets and read the frame rate in parallel, then map the request.
    ///
    /// A failed packet listing fails the prediction. A frame rate the probe
    /// can't report only leaves the rate unknown.
    pub async fn predict(
        &self,
        input: &Path,
        requested_start: f64,
        requested_end: f64,
        policy: ToolPolicy,
    ) -> DomainResult<CutPrediction> {
        let ffprobe = self.resolver.resolve(Tool::Ffprobe, policy)?;
        let packet_args = packet_time_args(input);
        let rate_args = frame_rate_args(input);

        let (packets, rate) = tokio::try_join!(
            self.runner.run(&ffprobe.path, &packet_args),
            self.runner.run(&ffprobe.path, &rate_args),
        )?;

        if !packets.success() {
            return Err(DomainError::CommandFailed {
                exit_code: packets.exit_code,
                output: packets.trimmed_output().to_string(),
            });
        }

        let frame_rate = if rate.success() {
            parse_frame_rate(&rate.output)
        } else {
            warn!(
                input = %input.display(),
                exit_code = rate.exit_code,
                "Frame rate probe failed, continuing without it"
            );
            None
        };

        let times = parse_packet_times(&packets.output);
        let prediction = predict_boundaries(requested_start, requested_end, &times, frame_rate);
        debug!(
            input = %input.display(),
            packets = times.len(),
            prediction = %prediction,
            "Predicted cut"
        );
        Ok(prediction)
    }
}
