//! flowd - in-process message pipeline daemon
//!
//! # Usage
//!
//! ```bash
//! # Run the pipeline (default)
//! flowd
//! flowd --config configs/flowd.toml
//!
//! # Validate a config without starting anything
//! flowd check --config configs/flowd.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flowd_config::LogFormat;

/// flowd - in-process message pipeline daemon
#[derive(Parser, Debug)]
#[command(name = "flowd")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, default_value = "configs/flowd.toml", global = true)]
    config: std::path::PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline
    Run(cmd::run::RunArgs),

    /// Validate a config without starting anything
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => cmd::run::run(args).await,
        Some(Command::Check(args)) => cmd::check::run(args),
        // No subcommand runs the pipeline.
        None => {
            let args = cmd::run::RunArgs {
                config: cli.config,
                log_level: cli.log_level,
            };
            cmd::run::run(args).await
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}
