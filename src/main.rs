//! Binary entry point for spotwatch.
//!
//! Reads spot payloads, one JSON object per line, and prints a notification
//! for each new cross-region contact.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{RunOptions, cmd_config, cmd_lookup, cmd_run, cmd_topics};
use spotwatch::config::SpotwatchConfig;
use spotwatch::io::OutputFormat;
use spotwatch::observability;
use spotwatch::services::TimeBase;
use std::path::PathBuf;
use std::process::ExitCode;

/// Spotwatch - notifies new cross-region radio contacts.
#[derive(Parser)]
#[command(name = "spotwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Process a spot feed and print new contacts.
    Run {
        /// NDJSON feed file (default: stdin).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (text, json).
        #[arg(short, long)]
        format: Option<String>,

        /// Clock driving the window (arrival, event).
        #[arg(long)]
        time_base: Option<String>,

        /// Suppression window in seconds.
        #[arg(long)]
        window_secs: Option<u64>,
    },

    /// Print broker topic filters for the home regions.
    Topics {
        /// Band (default from config).
        #[arg(long)]
        band: Option<String>,

        /// Mode (default from config).
        #[arg(long)]
        mode: Option<String>,
    },

    /// Resolve an entity code.
    Lookup {
        /// Entity code.
        code: i64,
    },

    /// Show configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(&config.observability, cli.verbose) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(
    command: Commands,
    config: SpotwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            input,
            format,
            time_base,
            window_secs,
        } => {
            let options = RunOptions {
                input,
                format: format.as_deref().map(str::parse::<OutputFormat>).transpose()?,
                time_base: time_base.as_deref().map(TimeBase::parse).transpose()?,
                window_secs,
            };
            cmd_run(config, options).await
        },
        Commands::Topics { band, mode } => cmd_topics(&config, band, mode),
        Commands::Lookup { code } => cmd_lookup(&config, code),
        Commands::Config { show } => cmd_config(&config, show),
    }
}

/// Loads configuration from `--config`, `SPOTWATCH_CONFIG_PATH` or the
/// default location, then applies environment overrides.
fn load_config(path: Option<&str>) -> Result<SpotwatchConfig, Box<dyn std::error::Error>> {
    let config = if let Some(config_path) = path {
        SpotwatchConfig::load_from_file(std::path::Path::new(config_path))?
    } else {
        match std::env::var("SPOTWATCH_CONFIG_PATH") {
            Ok(config_path) if !config_path.trim().is_empty() => {
                SpotwatchConfig::load_from_file(std::path::Path::new(&config_path))?
            },
            _ => SpotwatchConfig::load_default()?,
        }
    };

    Ok(config.apply_env_overrides()?)
}
