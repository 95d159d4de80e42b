use chrono::{DateTime, Utc};
use delta::registry::WorkerRegistry;

const TS: &str = "2026-01-01T00:00:00+00:00";

#[test]
fn test_insert_and_get() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();

    let record = registry.get("w1").unwrap();
    assert_eq!(record.service_id, "w1");
    assert_eq!(record.service_host, "127.0.0.1");
    assert_eq!(record.port, 9001);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("w1"));
}

#[test]
fn test_insert_rejects_malformed_timestamp() {
    let mut registry = WorkerRegistry::new();
    let result = registry.insert("w1", "127.0.0.1", 9001, "not-a-timestamp");

    assert!(result.is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_no_duplicate_ids_and_first_insert_order() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();
    registry.insert("w2", "127.0.0.1", 9002, TS).unwrap();
    registry.insert("w3", "127.0.0.1", 9003, TS).unwrap();

    // Re-inserting an existing id refreshes the record without duplicating
    // it or moving its position.
    registry.insert("w1", "10.0.0.5", 9100, TS).unwrap();

    assert_eq!(registry.len(), 3);
    let order: Vec<&str> = registry.iter().map(|r| r.service_id.as_str()).collect();
    assert_eq!(order, vec!["w1", "w2", "w3"]);

    let refreshed = registry.get("w1").unwrap();
    assert_eq!(refreshed.service_host, "10.0.0.5");
    assert_eq!(refreshed.port, 9100);
}

#[test]
fn test_remove_returns_record() {
    let mut registry = WorkerRegistry::new();
    assert!(registry.remove("w1").is_none());

    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();
    let removed = registry.remove("w1").unwrap();

    assert_eq!(removed.service_id, "w1");
    assert_eq!(removed.port, 9001);
    assert!(registry.is_empty());
    assert!(registry.iter().next().is_none());
}

#[test]
fn test_update_heartbeat_unknown_worker_is_noop() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();

    // A heartbeat for an unregistered id is dropped, not an error.
    registry.update_heartbeat("ghost", TS).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(!registry.contains("ghost"));
}

#[test]
fn test_update_heartbeat_rejects_malformed_timestamp() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();

    let result = registry.update_heartbeat("w1", "yesterday-ish");
    assert!(result.is_err());

    // The record keeps its previous heartbeat.
    let expected: DateTime<Utc> = DateTime::parse_from_rfc3339(TS).unwrap().into();
    assert_eq!(registry.get("w1").unwrap().last_heartbeat, expected);
}

#[test]
fn test_heartbeat_round_trip() {
    let t1 = "2026-01-01T00:00:00+00:00";
    let t2 = "2026-01-01T00:00:05.123456789+00:00";

    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, t1).unwrap();
    registry.update_heartbeat("w1", t2).unwrap();

    let expected: DateTime<Utc> = DateTime::parse_from_rfc3339(t2).unwrap().into();
    let record = registry.get("w1").unwrap();
    assert_eq!(record.last_heartbeat, expected);
    assert_eq!(record.last_heartbeat.to_rfc3339(), expected.to_rfc3339());
}

#[test]
fn test_empty_registry_returns_none() {
    let mut registry = WorkerRegistry::new();
    assert!(registry.next_for_task().is_none());
    assert!(registry.next_for_task().is_none());
}

#[test]
fn test_single_worker_round_robin() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();

    assert_eq!(registry.len(), 1);
    for _ in 0..5 {
        assert_eq!(registry.next_for_task().unwrap().service_id, "w1");
    }
}

#[test]
fn test_three_worker_rotation() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();
    registry.insert("w2", "127.0.0.1", 9002, TS).unwrap();
    registry.insert("w3", "127.0.0.1", 9003, TS).unwrap();

    let picks: Vec<String> = (0..9)
        .map(|_| registry.next_for_task().unwrap().service_id)
        .collect();

    assert_eq!(
        picks,
        vec!["w1", "w2", "w3", "w1", "w2", "w3", "w1", "w2", "w3"]
    );
}

#[test]
fn test_round_robin_fairness_bounds() {
    let mut registry = WorkerRegistry::new();
    for i in 0..4 {
        registry
            .insert(&format!("w{}", i), "127.0.0.1", 9000 + i, TS)
            .unwrap();
    }

    let k = 10;
    let mut counts = std::collections::HashMap::new();
    for _ in 0..k {
        let picked = registry.next_for_task().unwrap().service_id;
        *counts.entry(picked).or_insert(0u32) += 1;
    }

    // Each of the 4 workers is picked floor(10/4)..=ceil(10/4) times.
    assert_eq!(counts.len(), 4);
    for count in counts.values() {
        assert!((2..=3).contains(count), "unfair pick count {}", count);
    }
}

#[test]
fn test_removed_worker_not_selected() {
    let mut registry = WorkerRegistry::new();
    registry.insert("w1", "127.0.0.1", 9001, TS).unwrap();
    registry.insert("w2", "127.0.0.1", 9002, TS).unwrap();
    registry.insert("w3", "127.0.0.1", 9003, TS).unwrap();

    registry.remove("w2");

    for _ in 0..6 {
        let picked = registry.next_for_task().unwrap().service_id;
        assert_ne!(picked, "w2");
    }
}
