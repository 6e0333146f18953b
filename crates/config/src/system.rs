//! System-wide settings
//!
//! These settings apply across all actors and provide sensible defaults.

use serde::Deserialize;

/// System configuration shared by every actor
///
/// All fields have sensible defaults - you only need to specify what you
/// want to change.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Worker tasks spawned per actor-peer edge
    /// Default: number of CPU cores
    pub maxprocs: usize,

    /// Default capacity of per-edge handoff queues
    /// Default: 64
    pub queue_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            maxprocs: num_cpus(),
            queue_size: 64,
        }
    }
}

/// Get the number of available CPUs, defaulting to 4 if detection fails
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();
        assert!(config.maxprocs > 0);
        assert_eq!(config.queue_size, 64);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: SystemConfig = toml::from_str("").unwrap();
        assert!(config.maxprocs > 0);
        assert_eq!(config.queue_size, 64);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SystemConfig = toml::from_str("maxprocs = 2").unwrap();
        assert_eq!(config.maxprocs, 2);
        // Defaults still apply
        assert_eq!(config.queue_size, 64);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
maxprocs = 8
queue_size = 256
"#;
        let config: SystemConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.maxprocs, 8);
        assert_eq!(config.queue_size, 256);
    }
}
