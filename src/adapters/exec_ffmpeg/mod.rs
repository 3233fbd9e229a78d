//! FFmpeg execution adapter
//!
//! Performs the stream-copy trim. Seek and length are written with two
//! decimals, so the executed cut has 10ms granularity at best.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::tool_resolver::ExecutableResolver;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::format_command_seconds;

/// `ffmpeg` arguments for a stream-copy cut of every stream
pub fn cut_args(job: &CutJob) -> Vec<OsString> {
    let overwrite_flag = if job.overwrite { "-y" } else { "-n" };
    vec![
        overwrite_flag.into(),
        "-ss".into(),
        format_command_seconds(job.start).into(),
        "-i".into(),
        job.input.as_os_str().to_os_string(),
        "-c".into(),
        "copy".into(),
        "-map".into(),
        "0".into(),
        "-t".into(),
        format_command_seconds(job.duration).into(),
        job.output.as_os_str().to_os_string(),
    ]
}

/// Runs ffmpeg stream-copy cuts
#[derive(Clone)]
pub struct Cutter {
    resolver: Arc<ExecutableResolver>,
    runner: Arc<dyn ProcessPort>,
}

impl Cutter {
    pub fn new(resolver: Arc<ExecutableResolver>, runner: Arc<dyn ProcessPort>) -> Self {
        Self { resolver, runner }
    }

    pub async fn cut(
        &self,
        job: &CutJob,
        policy: ToolPolicy,
        cancel: &CancellationToken,
    ) -> DomainResult<()> {
        let ffmpeg = self.resolver.resolve(Tool::Ffmpeg, policy)?;
        info!(
            input = %job.input.display(),
            output = %job.output.display(),
            start = job.start,
            duration = job.duration,
            overwrite = job.overwrite,
            "Starting cut"
        );

        let started = Instant::now();
        let result = self
            .runner
            .run_cancellable(&ffmpeg.path, &cut_args(job), cancel)
            .await?;

        if !result.success() {
            warn!(exit_code = result.exit_code, output = %display_tail(&result.output), "Cut failed");
            return Err(DomainError::CommandFailed {
                exit_code: result.exit_code,
                output: result.trimmed_output().to_string(),
            });
        }

        info!(
            output = %job.output.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cut finished"
        );
        Ok(())
    }
}

/// Last line of tool output, for log fields
fn display_tail(output: &str) -> &str {
    output.trim().lines().last().unwrap_or_default()
}
