//! LC-Finder - picture viewer
//!
//! Main entry point: opens one picture and drives the viewer from
//! line commands on standard input.

mod app;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Walk the folder as a library list; closing returns to the browser
    Full,
    /// Open a single picture; its folder is scanned in the background
    Single,
}

#[derive(Parser, Debug)]
#[command(name = "lc-finder", version, about = "LC-Finder picture viewer")]
struct Cli {
    /// Picture to open
    path: PathBuf,

    /// Viewer mode (defaults to the configured start mode)
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Configuration file to use instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("LC-Finder starting...");

    let mut config = match &cli.config {
        Some(path) => app_core::AppConfig::load_from(path)?,
        None => load_default_config(),
    };
    if let Some(mode) = cli.mode {
        config.general.start_mode = match mode {
            Mode::Full => app_core::ViewerMode::Full,
            Mode::Single => app_core::ViewerMode::Single,
        };
    }

    app::run(config, cli.path)
}

/// Load the default config file, writing one with the defaults on first run
fn load_default_config() -> app_core::AppConfig {
    let config = match app_core::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Invalid configuration, using defaults: {}", e);
            return app_core::AppConfig::default();
        }
    };
    if !app_core::AppConfig::config_path().exists() {
        if let Err(e) = config.save() {
            tracing::warn!("Failed to save default configuration: {}", e);
        }
    }
    config
}
