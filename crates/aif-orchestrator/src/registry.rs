//! In-memory [`ServiceRegistry`] implementation: the orchestrator's
//! authoritative map of registered workers plus capability/model indices.
//!
//! Single-writer-at-a-time via `parking_lot::RwLock`; reads never block
//! other reads. `register`/`unregister` maintain `WorkerIndices` in
//! lockstep with the primary map so no index entry can ever dangle (spec
//! §3 invariant, pinned by the tests below).

use aif_core::contracts::{WorkerCapacity, WorkerDescriptor, WorkerStatus};
use aif_core::registry::{ServiceRegistry, WorkerIndices, WorkerRecord, WorkerStatusPatch};
use parking_lot::RwLock;
use std::collections::HashMap;

struct Inner {
    workers: HashMap<String, WorkerRecord>,
    indices: WorkerIndices,
}

pub struct InMemoryServiceRegistry {
    inner: RwLock<Inner>,
}

impl Default for InMemoryServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                workers: HashMap::new(),
                indices: WorkerIndices::new(),
            }),
        }
    }

    /// Register (or idempotently re-register) a worker from its wire
    /// descriptor. `registered_at` is stamped on first sight only; `register`
    /// itself preserves it across re-registration.
    pub fn register_descriptor(&self, descriptor: WorkerDescriptor, now_ms: u64) {
        self.register(WorkerRecord {
            id: descriptor.id,
            address: descriptor.address,
            capabilities: descriptor.capabilities,
            capacity: descriptor.capacity,
            registered_at: now_ms,
            last_seen: now_ms,
            status: WorkerStatus::Active,
        });
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn register(&self, mut worker: WorkerRecord) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.workers.get(&worker.id) {
            // Identity (`id`) and creation time never change across
            // re-registration; only the mutable fields in `worker` apply.
            worker.registered_at = existing.registered_at;
        }
        inner.indices.unindex(&worker.id);
        inner.indices.index(&worker.id, &worker.capabilities);
        inner.workers.insert(worker.id.clone(), worker);
    }

    fn unregister(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        inner.indices.unindex(id);
        inner.workers.remove(id).is_some()
    }

    fn workers_for_model(&self, model_id: &str) -> Vec<WorkerRecord> {
        let inner = self.inner.read();
        inner
            .indices
            .model_index
            .get(model_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.workers.get(id))
                    .filter(|w| w.status == WorkerStatus::Active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn workers_by_capability(&self, tag: &str) -> Vec<WorkerRecord> {
        let inner = self.inner.read();
        inner
            .indices
            .capability_index
            .get(tag)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.workers.get(id))
                    .filter(|w| w.status == WorkerStatus::Active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get(&self, id: &str) -> Option<WorkerRecord> {
        self.inner.read().workers.get(id).cloned()
    }

    fn update_status(&self, id: &str, patch: WorkerStatusPatch, now_ms: u64) -> bool {
        let mut inner = self.inner.write();
        let Some(worker) = inner.workers.get(id).cloned() else {
            return false;
        };
        let mut updated = worker.clone();
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(address) = patch.address {
            updated.address = address;
        }
        let reindex = if let Some(capabilities) = patch.capabilities {
            updated.capabilities = capabilities;
            true
        } else {
            false
        };
        updated.last_seen = now_ms;

        if reindex {
            inner.indices.unindex(id);
            inner.indices.index(id, &updated.capabilities);
        }
        inner.workers.insert(id.to_string(), updated);
        true
    }

    fn list_all(&self) -> Vec<WorkerRecord> {
        self.inner.read().workers.values().cloned().collect()
    }
}

/// Helper used by tests and by `register_descriptor` to build a fresh
/// `WorkerRecord` without going through the wire descriptor.
pub fn record_from(id: &str, address: &str, capabilities: Vec<String>, max_concurrent: u32, now_ms: u64) -> WorkerRecord {
    WorkerRecord {
        id: id.to_string(),
        address: address.to_string(),
        capabilities,
        capacity: WorkerCapacity { max_concurrent },
        registered_at: now_ms,
        last_seen: now_ms,
        status: WorkerStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup_by_model() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));

        let found = registry.workers_for_model("m1");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "w1");
        assert!(registry.workers_for_model("m2").is_empty());
    }

    #[test]
    fn double_registration_overwrites_mutable_fields_not_identity() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://old", vec!["m1".to_string()], 10, 100));
        registry.register(record_from("w1", "http://new", vec!["m1".to_string(), "m2".to_string()], 20, 200));

        let w = registry.get("w1").unwrap();
        assert_eq!(w.address, "http://new");
        assert_eq!(w.capacity.max_concurrent, 20);
        assert_eq!(w.registered_at, 100, "registered_at must survive re-registration");
        assert_eq!(registry.workers_for_model("m2").len(), 1);
    }

    #[test]
    fn unregister_leaves_no_dangling_index_entries() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["gpu".to_string(), "m1".to_string()], 10, 0));
        registry.register(record_from("w2", "http://w2", vec!["m1".to_string()], 10, 0));

        assert!(registry.unregister("w1"));
        assert_eq!(registry.workers_for_model("m1").len(), 1);
        assert!(registry.workers_by_capability("gpu").is_empty());
        assert!(!registry.unregister("w1"), "second unregister is a no-op, not an error");
    }

    #[test]
    fn unhealthy_workers_are_excluded_from_selection() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        registry.update_status(
            "w1",
            WorkerStatusPatch {
                status: Some(WorkerStatus::Unhealthy),
                ..Default::default()
            },
            1,
        );
        assert!(registry.workers_for_model("m1").is_empty());

        registry.update_status(
            "w1",
            WorkerStatusPatch {
                status: Some(WorkerStatus::Active),
                ..Default::default()
            },
            2,
        );
        assert_eq!(registry.workers_for_model("m1").len(), 1);
    }

    #[test]
    fn update_status_always_stamps_last_seen() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        registry.update_status("w1", WorkerStatusPatch::default(), 42);
        assert_eq!(registry.get("w1").unwrap().last_seen, 42);
    }
}
