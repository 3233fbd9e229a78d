// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod preview_check;
pub mod probe_ffprobe;
pub mod process_tokio;
pub mod tool_resolver;
pub mod toml_config;
pub mod toolkit;

// Re-export adapters
pub use exec_ffmpeg::Cutter;
pub use preview_check::FfprobePreviewCheck;
pub use probe_ffprobe::{CutPredictor, DurationProbe};
pub use process_tokio::TokioProcessRunner;
pub use tool_resolver::{ExecutableResolver, SearchPath, ToolSearchConfig};
pub use toml_config::TomlSettingsStore;
pub use toolkit::FfmpegToolkit;
