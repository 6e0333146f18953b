//! `flowd check` - validate a config without starting anything

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;

use flowd_config::Config;
use flowd_pipeline::{ActorResolver, Registry, Topology};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/flowd.toml")]
    pub config: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    config.validate().context("config validation failed")?;

    let registry = Registry::builtin();
    let mut topology = Topology::new();
    for (name, actor_cfg) in config.actors.iter() {
        if registry.resolve(&actor_cfg.module).is_none() {
            bail!("actor {name:?} uses unknown module {:?}", actor_cfg.module);
        }
        topology.add_node(name);
        for peer in &actor_cfg.connect {
            topology.add_edge(name, peer);
        }
    }
    let order = topology.sorted().context("actor graph is not startable")?;

    println!("{}: ok", args.config.display());
    println!("actors: {}", config.actors.len());
    println!("activation order: {}", order.join(" -> "));
    Ok(())
}
