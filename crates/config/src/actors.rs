//! Actor configuration blocks
//!
//! Each `[actors.<name>]` block declares one pipeline node: the module that
//! builds it, a free-form parameter table, and the ordered list of peer
//! names it connects to.
//!
//! # Example
//!
//! ```toml
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

use std::collections::HashMap;

use serde::Deserialize;

use flowd_core::{Params, Value};

/// Container for all actor configurations
///
/// Actors are stored as a map of name -> block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActorsConfig {
    /// Named actor blocks
    #[serde(flatten)]
    actors: HashMap<String, ActorConfig>,
}

impl ActorsConfig {
    /// Get an actor block by name
    pub fn get(&self, name: &str) -> Option<&ActorConfig> {
        self.actors.get(name)
    }

    /// Check if an actor exists
    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    /// Iterate over all actor blocks
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ActorConfig)> {
        self.actors.iter()
    }

    /// Get the number of configured actors
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Check if no actors are configured
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Get all actor names
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.actors.keys()
    }
}

/// Configuration for a single actor instance
#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    /// Module that builds this actor (e.g. `core.router`, `core.sink`)
    pub module: String,

    /// Free-form construction parameters
    #[serde(default)]
    pub params: toml::Table,

    /// Ordered list of peer names to connect to
    #[serde(default)]
    pub connect: Vec<String>,
}

impl ActorConfig {
    /// Construction parameters as the core tagged value type
    pub fn core_params(&self) -> Params {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), toml_to_value(v)))
            .collect()
    }
}

/// Convert a TOML value into the core tagged value type
pub(crate) fn toml_to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_value(v)))
                .collect(),
        ),
    }
}
