//! CLI module for TrimKit
//!
//! A headless front-end over the trim session: argument parsing and command
//! execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;
pub mod prompt;

/// TrimKit - keyframe-aware lossless video trimming
///
/// Cuts are stream copies performed by ffmpeg; boundaries snap to the
/// packets ffprobe reports.
#[derive(Parser, Debug)]
#[command(name = "trimkit")]
#[command(about = "TrimKit - lossless video trimming with ffmpeg")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level or filter directives
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Persisted settings file
    #[arg(long, global = true)]
    pub settings_file: Option<PathBuf>,

    /// Directory with bundled ffmpeg and ffprobe
    #[arg(long, global = true)]
    pub resource_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
            settings_file: self.settings_file.clone(),
            resource_dir: self.resource_dir.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the duration of a media file
    Probe(args::ProbeArgs),
    /// Show where a cut would actually start and end
    Predict(args::PredictArgs),
    /// Cut a range out of a media file without re-encoding
    Cut(args::CutArgs),
    /// Show which ffmpeg and ffprobe would be used
    Tools(args::ToolsArgs),
    /// Show or change persisted settings
    Settings(args::SettingsArgs),
}
