//! TrimKit CLI
//!
//! Lossless video trimming by stream copy, driven by external ffmpeg and
//! ffprobe executables.
//!
//! # Usage
//!
//! ```bash
//! trimkit probe --input video.mov
//! trimkit predict --input video.mov --start 1:00 --end 1:30
//! trimkit cut --input video.mov --start 1:00 --end 1:30 --output clip.mov
//! trimkit settings --prefer-installed true
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trimkit::app::DefaultAppContainer;
use trimkit::cli::{commands, Cli, Commands};
use trimkit::config_initialization::initialize_configuration_hierarchy;
use trimkit::utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli.config_overrides())
        .context("Failed to load configuration")?;
    init_logging(&config.log_level, config.json_logs)?;

    info!("Starting TrimKit");
    let container =
        DefaultAppContainer::new(&config).context("Failed to initialize application")?;

    match cli.command {
        Commands::Probe(args) => commands::probe(&container, args).await,
        Commands::Predict(args) => commands::predict(&container, args).await,
        Commands::Cut(args) => commands::cut(&container, args).await,
        Commands::Tools(args) => commands::tools(&container, args).await,
        Commands::Settings(args) => commands::settings(&container, args).await,
    }
}
