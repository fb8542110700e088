//! Proplake CLI - incremental real-estate lake ingestion tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use proplake_core::config::{LogFormat, LogLevel};
use proplake_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes for CLI operations.
///
/// Following Unix conventions:
/// - 0: Success
/// - 1-127: Application errors
#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// Configuration error (invalid config file, missing required fields)
    ConfigError = 1,
    /// Source error (HTTP connection, bad status, undecodable payload)
    SourceError = 2,
    /// Storage error (S3, filesystem, parquet encode/decode)
    StorageError = 3,
    /// General runtime error
    RuntimeError = 10,
}

impl ExitCode {
    /// Convert an error to an exit code by inspecting the error message.
    fn from_error(error: &anyhow::Error) -> Self {
        let error_str = error.to_string().to_lowercase();

        if error_str.contains("config") || error_str.contains("toml") || error_str.contains("parse")
        {
            ExitCode::ConfigError
        } else if error_str.contains("source")
            || error_str.contains("http")
            || error_str.contains("request")
        {
            ExitCode::SourceError
        } else if error_str.contains("storage")
            || error_str.contains("s3")
            || error_str.contains("parquet")
            || error_str.contains("object store")
        {
            ExitCode::StorageError
        } else {
            ExitCode::RuntimeError
        }
    }
}

mod commands;

#[derive(Parser)]
#[command(name = "proplake")]
#[command(about = "Incremental real-estate lake ingestion CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full pipeline pass (bronze then silver)
    Run {
        /// Override the explicit lower window bound (date or datetime)
        #[arg(long)]
        from: Option<String>,

        /// Override the explicit upper window bound (date or datetime)
        #[arg(long)]
        to: Option<String>,
    },

    /// Run only the raw extraction stage
    Bronze {
        /// Override the explicit lower window bound (date or datetime)
        #[arg(long)]
        from: Option<String>,

        /// Override the explicit upper window bound (date or datetime)
        #[arg(long)]
        to: Option<String>,
    },

    /// Run only the curated merge stage
    Silver,

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() {
    let exit_code = run_cli().await;
    std::process::exit(exit_code as i32);
}

/// Main CLI execution logic with proper error handling.
async fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    // Try to load config for log settings (optional - falls back to defaults)
    let monitoring = cli
        .config
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|content| toml::from_str::<Config>(&content).ok())
        .map(|config| config.monitoring)
        .unwrap_or_default();

    // Initialize logging
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new(level_directive(&monitoring.log_level)),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Configure log format based on config
    match monitoring.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
        }
    }

    let result = execute_command(cli).await;

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::from_error(&e)
        }
    }
}

fn level_directive(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

/// Execute the CLI command.
async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { from, to } => {
            let config = load_config(&cli.config)?;
            commands::run::run(config, from, to).await?;
        }

        Commands::Bronze { from, to } => {
            let config = load_config(&cli.config)?;
            commands::bronze::run(config, from, to).await?;
        }

        Commands::Silver => {
            let config = load_config(&cli.config)?;
            commands::silver::run(config).await?;
        }

        Commands::Validate => {
            let config = load_config(&cli.config)?;
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    let path = path.clone().unwrap_or_else(|| PathBuf::from("config.toml"));

    let content = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
