// Ports - Interface definitions (contracts)

use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Settings key for the "prefer installed tools over bundled" flag
pub const PREFER_INSTALLED_KEY: &str = "use_installed_ffmpeg";

/// Port for launching external processes
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Run a program to completion, killing it if `cancel` fires first.
    ///
    /// A non-zero exit code is returned as data, not as an error.
    async fn run_cancellable(
        &self,
        program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> DomainResult<ProcessResult>;

    /// Run a program to completion
    async fn run(&self, program: &Path, args: &[OsString]) -> DomainResult<ProcessResult> {
        self.run_cancellable(program, args, &CancellationToken::new())
            .await
    }
}

/// Port for the media operations the session controller drives
#[async_trait]
pub trait MediaToolsPort: Send + Sync {
    /// Container duration in seconds
    async fn media_duration(&self, input: &Path) -> DomainResult<f64>;

    /// Achievable cut boundaries for a requested range
    async fn predict_cut(
        &self,
        input: &Path,
        requested_start: f64,
        requested_end: f64,
    ) -> DomainResult<CutPrediction>;

    /// Stream-copy trim
    async fn cut(&self, job: &CutJob, cancel: &CancellationToken) -> DomainResult<()>;
}

/// Port for persisted user settings
pub trait SettingsPort: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;

    fn set_bool(&self, key: &str, value: bool) -> DomainResult<()>;

    /// Whether installed tools are preferred over bundled ones. Defaults to `false`.
    fn prefer_installed_tools(&self) -> bool {
        self.get_bool(PREFER_INSTALLED_KEY).unwrap_or(false)
    }
}

/// Port asking the user whether an existing output may be replaced
#[async_trait]
pub trait OverwritePrompt: Send + Sync {
    async fn confirm_overwrite(&self, output: &Path) -> bool;
}

/// Port checking whether an input can be previewed
#[async_trait]
pub trait PreviewCheckPort: Send + Sync {
    /// `None` when a preview is possible, otherwise a human readable reason
    async fn unavailable_reason(&self, input: &Path) -> Option<String>;
}
