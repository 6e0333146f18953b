//! `flowd run` - build the pipeline and serve until shutdown

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use flowd_config::Config;
use flowd_pipeline::{Pipeline, Registry};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/flowd.toml")]
    pub config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.log.level.as_str());
    crate::init_logging(level, config.log.format)?;

    tracing::info!(config = %args.config.display(), "starting flowd");

    let pipeline = Pipeline::build(Arc::new(config), &Registry::builtin())
        .await
        .context("failed to build pipeline")?;
    let mut failures = pipeline
        .take_failures()
        .expect("failure channel taken exactly once");

    pipeline.start().await.context("failed to start pipeline")?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
        fatal = failures.recv() => {
            if let Some(fatal) = fatal {
                tracing::error!(actor = %fatal.actor, error = %fatal.error, "fatal actor failure");
            }
        }
    }

    pipeline.stop().await.context("failed to stop pipeline")?;
    tracing::info!("flowd exited cleanly");
    Ok(())
}
