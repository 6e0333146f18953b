//! Module name to actor constructor mapping
//!
//! Every actor in the config carries a `module` string; the registry
//! resolves it to a constructor at build time. [`Registry::builtin`]
//! knows the stock actors; embedders add their own modules with
//! [`Registry::register`] or by layering an [`ActorResolver`] of their
//! own.

use std::collections::HashMap;

use flowd_core::Constructor;

/// Resolves a config module name to a constructor
pub trait ActorResolver: Send + Sync {
    fn resolve(&self, module: &str) -> Option<Constructor>;
}

/// Constructor table keyed by module name
#[derive(Default)]
pub struct Registry {
    modules: HashMap<String, Constructor>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the stock actor modules
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("core.receiver.tcp", flowd_actors::TcpReceiver::build);
        registry.register("core.receiver.udp", flowd_actors::UdpReceiver::build);
        registry.register("core.router", flowd_actors::Router::build);
        registry.register("core.fanout", flowd_actors::Fanout::build);
        registry.register("core.throttler", flowd_actors::Throttler::build);
        registry.register("core.sink", flowd_actors::Sink::build);
        registry
    }

    /// Register a module; an existing entry under the same name is
    /// replaced
    pub fn register(&mut self, module: &str, constructor: Constructor) {
        self.modules.insert(module.to_owned(), constructor);
    }

    #[inline]
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Registered module names, sorted
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ActorResolver for Registry {
    fn resolve(&self, module: &str) -> Option<Constructor> {
        self.modules.get(module).copied()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("modules", &self.modules())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flowd_core::{Actor, Context, Params, Result};

    use super::*;

    #[test]
    fn test_builtin_covers_stock_modules() {
        let registry = Registry::builtin();
        for module in [
            "core.receiver.tcp",
            "core.receiver.udp",
            "core.router",
            "core.fanout",
            "core.throttler",
            "core.sink",
        ] {
            assert!(registry.contains(module), "missing {module}");
        }
    }

    #[test]
    fn test_unknown_module_does_not_resolve() {
        assert!(Registry::builtin().resolve("core.missing").is_none());
    }

    #[test]
    fn test_custom_module_registers() {
        fn build(_name: &str, _ctx: Arc<Context>, _params: &Params) -> Result<Arc<dyn Actor>> {
            unimplemented!("constructor shape only")
        }

        let mut registry = Registry::new();
        registry.register("custom.probe", build);
        assert!(registry.resolve("custom.probe").is_some());
        assert_eq!(registry.modules(), vec!["custom.probe"]);
    }
}
