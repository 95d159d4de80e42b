use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::RingLeaderConfig;
use crate::registry::WorkerRegistry;

/// Periodic staleness check over the registry.
///
/// Detection and eviction are separate concerns: every sweep warns about
/// workers whose heartbeat is older than `stale_after`, and records are
/// removed only when `evict_stale` is set. Without it a stale worker stays
/// registered and selectable until its heartbeat stream actually closes.
pub struct LivenessSweep {
    registry: Arc<RwLock<WorkerRegistry>>,
    interval: Duration,
    stale_after: chrono::Duration,
    evict_stale: bool,
}

impl LivenessSweep {
    pub fn new(registry: Arc<RwLock<WorkerRegistry>>, config: &RingLeaderConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.sweep_interval),
            stale_after: chrono::Duration::seconds(config.stale_after as i64),
            evict_stale: config.evict_stale,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One staleness pass. Returns the ids found stale, evicted or not.
    pub async fn sweep_once(&self) -> Vec<String> {
        let now = Utc::now();

        let stale: Vec<String> = {
            let registry = self.registry.read().await;
            if registry.is_empty() {
                return Vec::new();
            }

            registry
                .iter()
                .filter(|record| now - record.last_heartbeat >= self.stale_after)
                .map(|record| record.service_id.clone())
                .collect()
        };

        if self.evict_stale {
            let mut registry = self.registry.write().await;
            for id in &stale {
                if registry.remove(id).is_some() {
                    tracing::warn!(worker_id = %id, "Evicted stale worker");
                }
            }
        } else {
            for id in &stale {
                tracing::warn!(worker_id = %id, "Worker seems to be down");
            }
        }

        stale
    }
}
