use std::sync::Arc;

use tracing::debug;

use crate::adapters::{
    ExecutableResolver, FfmpegToolkit, FfprobePreviewCheck, TokioProcessRunner, TomlSettingsStore,
};
use crate::app::session::TrimSession;
use crate::config_initialization::AppConfig;
use crate::domain::errors::DomainError;
use crate::ports::{MediaToolsPort, OverwritePrompt, PreviewCheckPort, ProcessPort, SettingsPort};

pub trait AppContainer: Send + Sync {
    fn toolkit(&self) -> Arc<FfmpegToolkit>;
    fn settings(&self) -> Arc<TomlSettingsStore>;
    fn session(&self, overwrite: Arc<dyn OverwritePrompt>) -> TrimSession;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    settings: Arc<TomlSettingsStore>,
    toolkit: Arc<FfmpegToolkit>,
    preview: Arc<FfprobePreviewCheck>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let settings = Arc::new(match config.settings_path() {
            Some(path) => TomlSettingsStore::open(path)?,
            None => TomlSettingsStore::in_memory(),
        });
        let resolver = Arc::new(ExecutableResolver::new(config.tool_search()));
        let runner: Arc<dyn ProcessPort> = Arc::new(TokioProcessRunner::new());

        let toolkit = Arc::new(FfmpegToolkit::new(
            Arc::clone(&resolver),
            Arc::clone(&runner),
            Arc::clone(&settings) as Arc<dyn SettingsPort>,
        ));

        let preview = Arc::new(FfprobePreviewCheck::new(
            resolver,
            runner,
            Arc::clone(&settings) as Arc<dyn SettingsPort>,
            config.preview_timeout(),
        ));

        debug!(settings = ?settings.file_path(), "Container initialized");
        Ok(Self {
            config: config.clone(),
            settings,
            toolkit,
            preview,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn toolkit(&self) -> Arc<FfmpegToolkit> {
        Arc::clone(&self.toolkit)
    }

    fn settings(&self) -> Arc<TomlSettingsStore> {
        Arc::clone(&self.settings)
    }

    fn session(&self, overwrite: Arc<dyn OverwritePrompt>) -> TrimSession {
        TrimSession::new(
            Arc::clone(&self.toolkit) as Arc<dyn MediaToolsPort>,
            Arc::clone(&self.preview) as Arc<dyn PreviewCheckPort>,
            overwrite,
            self.config.timing(),
        )
    }
}
