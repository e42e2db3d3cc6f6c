//! Worker registry contract — kernel-level trait for the orchestrator's
//! service registry.
//!
//! Modeled on a classic capability registry: a primary id → record map plus
//! secondary indices for fast filtered lookup. The trait is synchronous and
//! infallible on the read path (index maintenance happens inside
//! `register`/`unregister`, never lazily), matching the spec's invariant
//! that no index entry may ever dangle.

use crate::contracts::{WorkerCapacity, WorkerStatus};
use std::collections::HashMap;

/// A single worker record as held by the orchestrator's registry.
#[derive(Debug, Clone)]
pub struct WorkerRecord {
    pub id: String,
    pub address: String,
    pub capabilities: Vec<String>,
    pub capacity: WorkerCapacity,
    pub registered_at: u64,
    pub last_seen: u64,
    pub status: WorkerStatus,
}

/// Mutable fields a status update (health probe, re-registration) may change.
#[derive(Debug, Clone, Default)]
pub struct WorkerStatusPatch {
    pub status: Option<WorkerStatus>,
    pub capabilities: Option<Vec<String>>,
    pub address: Option<String>,
}

/// Kernel contract for the worker registry.
///
/// Implementations must uphold: every id present in `capability_index` or
/// `model_index` is a live, `Active` entry in the primary map; `unregister`
/// removes the id from every index atomically with respect to readers.
pub trait ServiceRegistry: Send + Sync {
    /// Insert or idempotently overwrite a worker's mutable fields.
    /// Identity fields (`id`) never change across re-registration.
    fn register(&self, worker: WorkerRecord);

    /// Remove a worker and every index entry referencing it.
    /// Returns `true` if a worker with this id existed.
    fn unregister(&self, id: &str) -> bool;

    /// Active workers whose capabilities include `model_id`.
    fn workers_for_model(&self, model_id: &str) -> Vec<WorkerRecord>;

    /// Active workers carrying the given capability tag.
    fn workers_by_capability(&self, tag: &str) -> Vec<WorkerRecord>;

    /// Look up a single worker regardless of status.
    fn get(&self, id: &str) -> Option<WorkerRecord>;

    /// Apply a status patch, always stamping `last_seen = now_ms`.
    fn update_status(&self, id: &str, patch: WorkerStatusPatch, now_ms: u64) -> bool;

    /// Snapshot of every registered worker, active or not.
    fn list_all(&self) -> Vec<WorkerRecord>;
}

/// In-memory index pair maintained alongside the primary worker map.
///
/// Kept as a free-standing helper (rather than baked into a single
/// implementation) so both the production registry and test doubles can
/// reuse the same index-maintenance logic.
#[derive(Debug, Default)]
pub struct WorkerIndices {
    pub capability_index: HashMap<String, Vec<String>>,
    pub model_index: HashMap<String, Vec<String>>,
}

impl WorkerIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a worker's capability tags. Model ids are tags too, by
    /// convention (a capability that looks like a registered model id is
    /// indexed into `model_index` as well).
    pub fn index(&mut self, worker_id: &str, capabilities: &[String]) {
        for tag in capabilities {
            self.capability_index
                .entry(tag.clone())
                .or_default()
                .push(worker_id.to_string());
            self.model_index
                .entry(tag.clone())
                .or_default()
                .push(worker_id.to_string());
        }
    }

    /// Remove every index entry referencing `worker_id`.
    pub fn unindex(&mut self, worker_id: &str) {
        for ids in self.capability_index.values_mut() {
            ids.retain(|id| id != worker_id);
        }
        for ids in self.model_index.values_mut() {
            ids.retain(|id| id != worker_id);
        }
        self.capability_index.retain(|_, ids| !ids.is_empty());
        self.model_index.retain(|_, ids| !ids.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_unindex_leave_no_dangling_entries() {
        let mut idx = WorkerIndices::new();
        idx.index("w1", &["gpu".to_string(), "m1".to_string()]);
        idx.index("w2", &["m1".to_string()]);

        assert_eq!(idx.model_index["m1"].len(), 2);
        idx.unindex("w1");
        assert_eq!(idx.model_index["m1"], vec!["w2".to_string()]);
        assert!(!idx.capability_index.contains_key("gpu"));
    }
}
