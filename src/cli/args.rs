//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the predict command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (seconds or MM:SS)
    #[arg(short, long)]
    pub start: String,

    /// End time (seconds or MM:SS)
    #[arg(short, long)]
    pub end: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: `<name>-cut.<ext>` next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start time (seconds or MM:SS)
    #[arg(short, long, default_value = "0")]
    pub start: String,

    /// End time (seconds or MM:SS, default: end of the input)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Overwrite an existing output without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the tools command
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the settings command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Prefer installed ffmpeg/ffprobe over the bundled ones
    #[arg(long)]
    pub prefer_installed: Option<bool>,
}
