//! Pipeline assembly and orchestration
//!
//! Glue between a parsed [`Config`] and a running actor graph. The
//! [`Registry`] maps config module names to constructors, the
//! [`Topology`] orders the graph, and the [`Pipeline`] constructs, wires,
//! starts and stops the whole thing.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flowd_config::Config;
//! use flowd_pipeline::{Pipeline, Registry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::from_file("flowd.toml")?);
//! let pipeline = Pipeline::build(config, &Registry::builtin()).await?;
//! pipeline.start().await?;
//! // ... serve until shutdown ...
//! pipeline.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Config`]: flowd_config::Config

mod error;
mod pipeline;
mod registry;
mod topology;

pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use registry::{ActorResolver, Registry};
pub use topology::Topology;
