use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// One registered worker, keyed by its self-assigned service id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    pub service_id: String,
    pub service_host: String,
    pub port: u32,
    pub last_heartbeat: DateTime<Utc>,
}

/// Ordered collection of known workers with a round-robin cursor.
///
/// Insertion order is preserved and defines the round-robin order. The
/// registry itself is not synchronized; the leader wraps it in an
/// `Arc<RwLock<_>>` and every operation here runs inside one critical
/// section, which keeps the cursor consistent with the size it wraps
/// against.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    records: HashMap<String, WorkerRecord>,
    order: Vec<String>,
    cursor: u64,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the record for `service_id`. Re-inserting an
    /// existing id refreshes the record but keeps its round-robin position.
    pub fn insert(
        &mut self,
        service_id: &str,
        service_host: &str,
        port: u32,
        timestamp: &str,
    ) -> Result<()> {
        let last_heartbeat = parse_timestamp(timestamp)?;

        if !self.records.contains_key(service_id) {
            self.order.push(service_id.to_string());
        }
        self.records.insert(
            service_id.to_string(),
            WorkerRecord {
                service_id: service_id.to_string(),
                service_host: service_host.to_string(),
                port,
                last_heartbeat,
            },
        );

        Ok(())
    }

    /// Refresh `last_heartbeat` for a known worker. A heartbeat for an id
    /// that is not registered is dropped without error: the registration may
    /// have raced with a removal, which is expected under churn.
    pub fn update_heartbeat(&mut self, service_id: &str, timestamp: &str) -> Result<()> {
        let last_heartbeat = parse_timestamp(timestamp)?;

        if let Some(record) = self.records.get_mut(service_id) {
            record.last_heartbeat = last_heartbeat;
        }

        Ok(())
    }

    /// Remove and return the record for `service_id`, if present.
    pub fn remove(&mut self, service_id: &str) -> Option<WorkerRecord> {
        let record = self.records.remove(service_id)?;
        if let Some(pos) = self.order.iter().position(|id| id == service_id) {
            self.order.remove(pos);
        }
        Some(record)
    }

    /// Round-robin selection among the registered workers.
    ///
    /// The cursor is a position index, not a worker identity: removals and
    /// insertions can shift which worker a given position maps to. Rotation
    /// is exact under a stable worker set and best-effort under churn.
    pub fn next_for_task(&mut self) -> Option<WorkerRecord> {
        if self.order.is_empty() {
            return None;
        }

        self.cursor += 1;
        if self.cursor as usize > self.order.len() {
            self.cursor = 1;
        }

        let index = (self.cursor as usize - 1) % self.order.len();
        self.records.get(&self.order[index]).cloned()
    }

    /// Iterate records in insertion order. Used by the liveness sweep under
    /// a read lock.
    pub fn iter(&self) -> impl Iterator<Item = &WorkerRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn get(&self, service_id: &str) -> Option<&WorkerRecord> {
        self.records.get(service_id)
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.records.contains_key(service_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)?;
    Ok(parsed.with_timezone(&Utc))
}
