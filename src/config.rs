use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Retry policy for connection establishment.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsConfig {
    /// Reserved for a bounded-retry mode; the registration path currently
    /// retries forever and does not consult it.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds to wait between attempts. The delay is fixed, not growing.
    #[serde(default = "default_time_between_retries")]
    pub time_between_retries: u64,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            time_between_retries: default_time_between_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RingLeaderConfig {
    #[serde(default)]
    pub connections: ConnectionsConfig,
    /// Seconds between liveness sweeps over the registry.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
    /// Heartbeat age in seconds after which a worker counts as stale.
    #[serde(default = "default_stale_after")]
    pub stale_after: u64,
    /// Remove stale workers during the sweep instead of only warning about
    /// them. Off by default: without it a stale worker stays selectable
    /// until its heartbeat stream actually closes.
    #[serde(default)]
    pub evict_stale: bool,
}

impl Default for RingLeaderConfig {
    fn default() -> Self {
        Self {
            connections: ConnectionsConfig::default(),
            sweep_interval: default_sweep_interval(),
            stale_after: default_stale_after(),
            evict_stale: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between heartbeats on an open stream.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval: u64,
    /// Cap for the stream-setup backoff, in minutes.
    #[serde(default = "default_backoff_max")]
    pub backoff_max: u64,
    #[serde(default)]
    pub connections: ConnectionsConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: default_heartbeat_interval(),
            backoff_max: default_backoff_max(),
            connections: ConnectionsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BloomConfig {
    /// Filter width in bits.
    #[serde(default = "default_filter_size")]
    pub filter_size: u64,
    /// Number of digest functions to probe with, 3 to 5.
    #[serde(default = "default_hash_functions")]
    pub hash_functions: u8,
    /// Digest bytes used per probe position, 1 to 19.
    #[serde(default = "default_entropy")]
    pub entropy: u8,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            filter_size: default_filter_size(),
            hash_functions: default_hash_functions(),
            entropy: default_entropy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeltaConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "ring-leader", default)]
    pub ring_leader: RingLeaderConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub bloom: BloomConfig,
}

impl DeltaConfig {
    /// Load configuration from a TOML file. A missing file falls back to
    /// the documented defaults; a malformed file is a startup error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(toml::from_str(&data)?)
    }
}

fn default_max_retries() -> u32 {
    10
}

fn default_time_between_retries() -> u64 {
    5
}

fn default_sweep_interval() -> u64 {
    15
}

fn default_stale_after() -> u64 {
    15
}

fn default_heartbeat_interval() -> u64 {
    2
}

fn default_backoff_max() -> u64 {
    2
}

fn default_filter_size() -> u64 {
    100_000
}

fn default_hash_functions() -> u8 {
    3
}

fn default_entropy() -> u8 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_config_default() {
        let cfg = ConnectionsConfig::default();
        assert_eq!(cfg.max_retries, 10);
        assert_eq!(cfg.time_between_retries, 5);
    }

    #[test]
    fn ring_leader_config_default() {
        let cfg = RingLeaderConfig::default();
        assert_eq!(cfg.sweep_interval, 15);
        assert_eq!(cfg.stale_after, 15);
        assert!(!cfg.evict_stale);
    }

    #[test]
    fn worker_config_default() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.heartbeat_interval, 2);
        assert_eq!(cfg.backoff_max, 2);
        assert_eq!(cfg.connections.max_retries, 10);
        assert_eq!(cfg.connections.time_between_retries, 5);
    }

    #[test]
    fn bloom_config_default() {
        let cfg = BloomConfig::default();
        assert_eq!(cfg.filter_size, 100_000);
        assert_eq!(cfg.hash_functions, 3);
        assert_eq!(cfg.entropy, 8);
    }

    #[test]
    fn delta_config_default_has_no_title() {
        let cfg = DeltaConfig::default();
        assert!(cfg.title.is_none());
    }
}
