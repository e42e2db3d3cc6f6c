//! Health monitor: per-worker probe state and the 3-strikes quarantine
//! transition (spec §4.4.3).

use aif_core::contracts::WorkerStatus;
use aif_core::registry::{ServiceRegistry, WorkerStatusPatch};
use dashmap::DashMap;
use std::sync::Arc;

const QUARANTINE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthState {
    pub consecutive_failures: u32,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub last_check_ms: u64,
    pub status: WorkerStatus,
}

/// A single probe attempt against a worker. Implementations in `main.rs`
/// hit the worker's `/health` endpoint; tests can substitute an in-memory
/// stub so quarantine/recovery logic runs without a network.
#[async_trait::async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, worker_id: &str, address: &str) -> bool;
}

pub struct HealthMonitor {
    registry: Arc<dyn ServiceRegistry>,
    probe: Arc<dyn HealthProbe>,
    state: DashMap<String, HealthState>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<dyn ServiceRegistry>, probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            registry,
            probe,
            state: DashMap::new(),
        }
    }

    pub fn state_for(&self, worker_id: &str) -> HealthState {
        self.state.get(worker_id).map(|s| *s).unwrap_or_default()
    }

    /// Probe a single worker and apply the resulting state transition. On
    /// the third-and-later consecutive failure, the worker's registry
    /// status flips to `Unhealthy`; on the first success after that, it
    /// flips back to `Active`. Quarantined workers continue to be probed.
    pub async fn check_one(&self, worker_id: &str, address: &str, now_ms: u64) {
        let healthy = self.probe.probe(worker_id, address).await;
        let mut entry = self.state.entry(worker_id.to_string()).or_default();
        entry.total_checks += 1;
        entry.last_check_ms = now_ms;

        if healthy {
            entry.consecutive_failures = 0;
            entry.successful_checks += 1;
            entry.status = WorkerStatus::Active;
            drop(entry);
            self.registry.update_status(
                worker_id,
                WorkerStatusPatch {
                    status: Some(WorkerStatus::Active),
                    ..Default::default()
                },
                now_ms,
            );
        } else {
            entry.consecutive_failures += 1;
            if entry.consecutive_failures >= QUARANTINE_THRESHOLD {
                entry.status = WorkerStatus::Unhealthy;
                drop(entry);
                self.registry.update_status(
                    worker_id,
                    WorkerStatusPatch {
                        status: Some(WorkerStatus::Unhealthy),
                        ..Default::default()
                    },
                    now_ms,
                );
            }
        }
    }

    /// One tick over every registered worker. Run on a fixed cadence by
    /// the orchestrator's background loop (`health_check_interval_ms`).
    pub async fn tick(&self, now_ms: u64) {
        for worker in self.registry.list_all() {
            self.check_one(&worker.id, &worker.address, now_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{record_from, InMemoryServiceRegistry};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct ScriptedProbe {
        healthy: AtomicBool,
    }

    #[async_trait::async_trait]
    impl HealthProbe for ScriptedProbe {
        async fn probe(&self, _worker_id: &str, _address: &str) -> bool {
            self.healthy.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn three_consecutive_failures_quarantine_the_worker() {
        let registry: Arc<dyn ServiceRegistry> = Arc::new(InMemoryServiceRegistry::new());
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        let probe = Arc::new(ScriptedProbe { healthy: AtomicBool::new(false) });
        let monitor = HealthMonitor::new(registry.clone(), probe.clone());

        for i in 0..2 {
            monitor.check_one("w1", "http://w1", i).await;
            assert!(!registry.workers_for_model("m1").is_empty(), "not quarantined until 3 failures");
        }
        monitor.check_one("w1", "http://w1", 3).await;
        assert!(registry.workers_for_model("m1").is_empty(), "quarantined after 3rd consecutive failure");

        probe.healthy.store(true, Ordering::SeqCst);
        monitor.check_one("w1", "http://w1", 4).await;
        assert_eq!(registry.workers_for_model("m1").len(), 1, "one success readmits the worker");
    }

    #[tokio::test]
    async fn a_single_success_between_failures_resets_the_streak() {
        let registry: Arc<dyn ServiceRegistry> = Arc::new(InMemoryServiceRegistry::new());
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        let probe = Arc::new(ScriptedProbe { healthy: AtomicBool::new(false) });
        let monitor = HealthMonitor::new(registry.clone(), probe.clone());

        monitor.check_one("w1", "http://w1", 0).await;
        monitor.check_one("w1", "http://w1", 1).await;
        probe.healthy.store(true, Ordering::SeqCst);
        monitor.check_one("w1", "http://w1", 2).await;
        probe.healthy.store(false, Ordering::SeqCst);
        monitor.check_one("w1", "http://w1", 3).await;
        monitor.check_one("w1", "http://w1", 4).await;
        assert!(!registry.workers_for_model("m1").is_empty(), "streak reset by the intervening success");
        assert_eq!(monitor.state_for("w1").consecutive_failures, 2);
    }
}
