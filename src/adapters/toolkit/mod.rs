//! The ffmpeg/ffprobe toolkit handed to the session controller

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::adapters::exec_ffmpeg::Cutter;
use crate::adapters::probe_ffprobe::{CutPredictor, DurationProbe};
use crate::adapters::tool_resolver::ExecutableResolver;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Duration probe, cut predictor and cutter sharing one resolver and runner.
///
/// The resolver policy is read from the settings store on every call.
#[derive(Clone)]
pub struct FfmpegToolkit {
    resolver: Arc<ExecutableResolver>,
    settings: Arc<dyn SettingsPort>,
    duration: DurationProbe,
    predictor: CutPredictor,
    cutter: Cutter,
}

impl FfmpegToolkit {
    pub fn new(
        resolver: Arc<ExecutableResolver>,
        runner: Arc<dyn ProcessPort>,
        settings: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            duration: DurationProbe::new(resolver.clone(), runner.clone()),
            predictor: CutPredictor::new(resolver.clone(), runner.clone()),
            cutter: Cutter::new(resolver.clone(), runner),
            resolver,
            settings,
        }
    }

    /// Policy selected by the persisted preference
    pub fn policy(&self) -> ToolPolicy {
        ToolPolicy::from_preference(self.settings.prefer_installed_tools())
    }

    pub fn resolve(&self, tool: Tool) -> DomainResult<ResolvedTool> {
        self.resolver.resolve(tool, self.policy())
    }

    pub fn installed_tools_available(&self) -> bool {
        self.resolver.installed_tools_available()
    }
}

#[async_trait]
impl MediaToolsPort for FfmpegToolkit {
    async fn media_duration(&self, input: &Path) -> DomainResult<f64> {
        self.duration.probe(input, self.policy()).await
    }

    async fn predict_cut(
        &self,
        input: &Path,
        requested_start: f64,
        requested_end: f64,
    ) -> DomainResult<CutPrediction> {
        self.predictor
            .predict(input, requested_start, requested_end, self.policy())
            .await
    }

    async fn cut(&self, job: &CutJob, cancel: &CancellationToken) -> DomainResult<()> {
        self.cutter.cut(job, self.policy(), cancel).await
    }
}
