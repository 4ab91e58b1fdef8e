//! Command-line interface

pub mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stats_report::config::AppConfig;

use commands::locate::{LocateCommands, handle_locate_command};
use commands::summarize::{SummarizeCommands, handle_summarize_command};

#[derive(Parser, Debug)]
#[command(
    name = "stats-report",
    about = "Locate and summarize the weekly statistics workbook",
    version
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List report workbooks in the report directory, oldest first
    Locate(LocateCommands),
    /// Summarize the latest (or a given) workbook
    Summarize(SummarizeCommands),
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log_level);

    if let Some(source) = &config.source {
        log::debug!("Loaded configuration from {}", source.display());
    }

    match cli.command {
        Commands::Locate(args) => handle_locate_command(args, &config),
        Commands::Summarize(args) => handle_summarize_command(args, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load configuration")
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();
}
