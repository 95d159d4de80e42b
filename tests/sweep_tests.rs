use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::RwLock;

use delta::config::RingLeaderConfig;
use delta::leader::LivenessSweep;
use delta::registry::WorkerRegistry;

async fn registry_with_worker(heartbeat_age_secs: i64) -> Arc<RwLock<WorkerRegistry>> {
    let registry = Arc::new(RwLock::new(WorkerRegistry::new()));
    let timestamp = (Utc::now() - ChronoDuration::seconds(heartbeat_age_secs)).to_rfc3339();
    registry
        .write()
        .await
        .insert("w1", "127.0.0.1", 9001, &timestamp)
        .unwrap();
    registry
}

/// Default policy: the sweep reports a stale worker but does not evict it,
/// so it stays selectable until its stream actually closes.
#[tokio::test]
async fn test_sweep_reports_stale_worker_without_evicting() {
    let registry = registry_with_worker(60).await;
    let sweep = LivenessSweep::new(registry.clone(), &RingLeaderConfig::default());

    let stale = sweep.sweep_once().await;
    assert_eq!(stale, vec!["w1".to_string()]);

    let mut registry = registry.write().await;
    assert!(registry.contains("w1"));
    assert_eq!(registry.next_for_task().unwrap().service_id, "w1");
}

/// With eviction toggled on, stale workers are removed and stop being
/// selectable.
#[tokio::test]
async fn test_sweep_evicts_stale_worker_when_toggled() {
    let registry = registry_with_worker(60).await;
    let config = RingLeaderConfig {
        evict_stale: true,
        ..RingLeaderConfig::default()
    };
    let sweep = LivenessSweep::new(registry.clone(), &config);

    let stale = sweep.sweep_once().await;
    assert_eq!(stale, vec!["w1".to_string()]);

    let mut registry = registry.write().await;
    assert!(!registry.contains("w1"));
    assert!(registry.next_for_task().is_none());
}

/// A worker heartbeating within the threshold is left alone either way.
#[tokio::test]
async fn test_sweep_ignores_fresh_worker() {
    let registry = registry_with_worker(0).await;
    let config = RingLeaderConfig {
        evict_stale: true,
        ..RingLeaderConfig::default()
    };
    let sweep = LivenessSweep::new(registry.clone(), &config);

    let stale = sweep.sweep_once().await;
    assert!(stale.is_empty());
    assert!(registry.read().await.contains("w1"));
}

/// An empty registry produces no stale reports.
#[tokio::test]
async fn test_sweep_on_empty_registry() {
    let registry = Arc::new(RwLock::new(WorkerRegistry::new()));
    let sweep = LivenessSweep::new(registry.clone(), &RingLeaderConfig::default());

    assert!(sweep.sweep_once().await.is_empty());
}
