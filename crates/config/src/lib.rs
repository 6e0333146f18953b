//! flowd Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use flowd_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(
//!     "[actors.out]\nmodule = \"core.sink\"",
//! ).unwrap();
//! assert_eq!(config.actors.len(), 1);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [system]
//! maxprocs = 4
//!
//! [log]
//! level = "info"
//!
//! [actors.udp_in]
//! module = "core.receiver.udp"
//! connect = ["router"]
//!   [actors.udp_in.params]
//!   bind_addr = "0.0.0.0:7101"
//!
//! [actors.router]
//! module = "core.router"
//! connect = ["out"]
//!
//! [actors.out]
//! module = "core.sink"
//!   [actors.out.params]
//!   sink_type = "null"
//! ```

mod actors;
mod error;
mod logging;
mod system;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use actors::{ActorConfig, ActorsConfig};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use system::SystemConfig;

use serde::Deserialize;

use flowd_core::{ConfigGet, Value};

/// Main configuration structure
///
/// All sections are optional with sensible defaults; a config without
/// actors parses but fails [`Config::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// System settings (worker parallelism, queue sizes)
    pub system: SystemConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Pipeline actors (receivers, routers, sinks, ...)
    pub actors: ActorsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        contents.parse()
    }

    /// Validate cross-references in the configuration
    ///
    /// Checks that every actor has a plausible module name and that every
    /// `connect` entry points at a configured actor. Module existence is
    /// checked later, against the registry, at pipeline build time.
    pub fn validate(&self) -> Result<()> {
        if self.actors.is_empty() {
            return Err(ConfigError::NoActors);
        }

        for (name, block) in self.actors.iter() {
            if block.module.is_empty() {
                return Err(ConfigError::invalid_module(
                    name,
                    &block.module,
                    "module name is empty",
                ));
            }
            if !block.module.contains('.') {
                return Err(ConfigError::invalid_module(
                    name,
                    &block.module,
                    "expected a namespaced name like `core.router`",
                ));
            }
            for peer in &block.connect {
                if !self.actors.contains(peer) {
                    return Err(ConfigError::unknown_peer(name, peer));
                }
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl ConfigGet for Config {
    /// Dot-path lookup for the keys the pipeline core consumes
    fn get(&self, key: &str) -> Option<Value> {
        match key {
            flowd_core::SYSTEM_MAXPROCS => Some(Value::Int(self.system.maxprocs as i64)),
            "system.queue_size" => Some(Value::Int(self.system.queue_size as i64)),
            "log.level" => Some(Value::Str(self.log.level.as_str().to_owned())),
            _ => None,
        }
    }
}
