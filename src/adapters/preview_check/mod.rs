//! Preview availability check
//!
//! Runs alongside the duration probe when an input is selected. It never
//! blocks loading; a reason is only shown to the user.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::tool_resolver::ExecutableResolver;
use crate::domain::model::*;
use crate::ports::*;

/// Container formats the preview player can't open
const UNSUPPORTED_EXTENSIONS: [&str; 1] = ["mkv"];

/// Checks that ffprobe sees a video stream, within a time limit
pub struct FfprobePreviewCheck {
    resolver: Arc<ExecutableResolver>,
    runner: Arc<dyn ProcessPort>,
    settings: Arc<dyn SettingsPort>,
    timeout: Duration,
}

impl FfprobePreviewCheck {
    pub fn new(
        resolver: Arc<ExecutableResolver>,
        runner: Arc<dyn ProcessPort>,
        settings: Arc<dyn SettingsPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            runner,
            settings,
            timeout,
        }
    }
}

/// `ffprobe` arguments printing the codec type of the first video stream
pub fn video_stream_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=codec_type",
        "-of",
        "csv=p=0",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_os_string());
    args
}

fn has_unsupported_extension(input: &Path) -> bool {
    input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            UNSUPPORTED_EXTENSIONS
                .iter()
                .any(|unsupported| ext.eq_ignore_ascii_case(unsupported))
        })
        .unwrap_or(false)
}

#[async_trait]
impl PreviewCheckPort for FfprobePreviewCheck {
    async fn unavailable_reason(&self, input: &Path) -> Option<String> {
        if has_unsupported_extension(input) {
            return Some("Preview is not supported for MKV files. Trimming still works.".into());
        }

        let policy = ToolPolicy::from_preference(self.settings.prefer_installed_tools());
        let ffprobe = match self.resolver.resolve(Tool::Ffprobe, policy) {
            Ok(ffprobe) => ffprobe,
            Err(e) => return Some(format!("Preview check unavailable: {}", e)),
        };

        let args = video_stream_args(input);
        let reason = match tokio::time::timeout(self.timeout, self.runner.run(&ffprobe.path, &args))
            .await
        {
            Err(_) => Some("Preview compatibility check timed out.".to_string()),
            Ok(Err(e)) => Some(format!("Preview check failed: {}", e)),
            Ok(Ok(result)) if !result.success() => {
                Some("Preview is unavailable: the file could not be read.".to_string())
            }
            Ok(Ok(result)) if !result.output.lines().any(|line| line.trim() == "video") => {
                Some("Preview is unavailable: no video track was found.".to_string())
            }
            Ok(Ok(_)) => None,
        };

        debug!(input = %input.display(), reason = ?reason, "Preview check finished");
        reason
    }
}
