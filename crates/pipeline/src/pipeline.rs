//! Pipeline assembly and orchestration
//!
//! [`Pipeline::build`] turns a validated [`Config`] into live actors:
//! every module name is resolved through the registry, every `connect`
//! entry becomes a wired edge, and the whole graph is ordered so that
//! consumers activate before the producers feeding them.
//!
//! Starting walks that order and records what actually started; stopping
//! walks the recorded list in exact reverse, so a partially started
//! pipeline winds down cleanly. Fatal actor failures surface through the
//! channel returned by [`Pipeline::take_failures`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use flowd_config::Config;
use flowd_core::{Actor, ConfigGet, Context, FatalFailure, Lifecycle};

use crate::error::{PipelineError, Result};
use crate::registry::ActorResolver;
use crate::topology::Topology;

pub struct Pipeline {
    ctx: Arc<Context>,
    actors: HashMap<String, Arc<dyn Actor>>,

    /// Activation order, consumers first
    order: Vec<String>,

    /// Names started so far, in start order
    started: Mutex<Vec<String>>,

    failures: Mutex<Option<mpsc::UnboundedReceiver<FatalFailure>>>,

    lifecycle: Lifecycle,
}

impl Pipeline {
    /// Construct and wire every actor the config defines
    ///
    /// # Errors
    ///
    /// Config validation failures, unknown modules, cyclic graphs and
    /// actor construction errors all fail the build; nothing is started
    /// yet at that point.
    pub async fn build(config: Arc<Config>, resolver: &dyn ActorResolver) -> Result<Self> {
        config.validate()?;

        let shared: Arc<dyn ConfigGet> = Arc::clone(&config) as Arc<dyn ConfigGet>;
        let (ctx, failure_rx) = Context::new(shared);
        let parallelism = ctx.maxprocs().map_err(PipelineError::Actor)?;

        let mut actors: HashMap<String, Arc<dyn Actor>> = HashMap::new();
        let mut topology = Topology::new();
        for (name, actor_cfg) in config.actors.iter() {
            let constructor = resolver.resolve(&actor_cfg.module).ok_or_else(|| {
                PipelineError::UnknownModule {
                    actor: name.clone(),
                    module: actor_cfg.module.clone(),
                }
            })?;
            let params = actor_cfg.core_params();
            let actor = constructor(name, Arc::clone(&ctx), &params)?;
            actors.insert(name.clone(), actor);
            topology.add_node(name);
            for peer in &actor_cfg.connect {
                topology.add_edge(name, peer);
            }
        }

        for (name, actor_cfg) in config.actors.iter() {
            let actor = &actors[name];
            for peer_name in &actor_cfg.connect {
                let peer = actors
                    .get(peer_name)
                    .ok_or_else(|| PipelineError::UnknownPeer {
                        actor: name.clone(),
                        peer: peer_name.clone(),
                    })?;
                actor.connect(parallelism, Arc::clone(peer)).await?;
                tracing::debug!(from = %name, to = %peer_name, "wired edge");
            }
        }

        let order = topology.sorted()?;
        tracing::info!(actors = actors.len(), "pipeline assembled");

        Ok(Self {
            ctx,
            actors,
            order,
            started: Mutex::new(Vec::new()),
            failures: Mutex::new(Some(failure_rx)),
            lifecycle: Lifecycle::new(),
        })
    }

    /// Start every actor, consumers before producers
    ///
    /// On failure the actors already running stay running; a subsequent
    /// [`stop`](Self::stop) winds exactly those down.
    pub async fn start(&self) -> Result<()> {
        self.lifecycle.start("pipeline")?;
        for name in &self.order {
            let actor = &self.actors[name];
            actor.start().await.map_err(|e| {
                tracing::error!(actor = %name, error = %e, "actor failed to start");
                PipelineError::Actor(e)
            })?;
            self.started.lock().push(name.clone());
            tracing::info!(actor = %name, "actor started");
        }
        tracing::info!("pipeline started");
        Ok(())
    }

    /// Stop the started actors in exact reverse start order
    ///
    /// Every actor gets its stop call even when an earlier one fails;
    /// the first failure is returned.
    pub async fn stop(&self) -> Result<()> {
        self.lifecycle.stop("pipeline")?;
        let mut names: Vec<String> = self.started.lock().drain(..).collect();
        names.reverse();

        let mut first_err = None;
        for name in names {
            let actor = &self.actors[name.as_str()];
            match actor.stop().await {
                Ok(()) => tracing::info!(actor = %name, "actor stopped"),
                Err(e) => {
                    tracing::error!(actor = %name, error = %e, "actor failed to stop");
                    first_err.get_or_insert(PipelineError::Actor(e));
                }
            }
        }

        match first_err {
            None => {
                tracing::info!("pipeline stopped");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }

    /// The receiver for fatal actor failures; yields `None` after the
    /// first call
    pub fn take_failures(&self) -> Option<mpsc::UnboundedReceiver<FatalFailure>> {
        self.failures.lock().take()
    }

    /// Look up a live actor by name
    pub fn actor(&self, name: &str) -> Option<Arc<dyn Actor>> {
        self.actors.get(name).cloned()
    }

    /// The computed activation order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// The shared actor context
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
