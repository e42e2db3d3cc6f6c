//! Load balancer: per-worker stats accumulation plus the four selection
//! strategies named in the spec (§4.4.2).

use crate::config::LoadBalancingStrategy;
use aif_core::registry::WorkerRecord;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;

/// Per-worker rolling statistics that feed `weighted` and `least-connections`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStats {
    pub request_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_processing_time_ms: u64,
    pub average_processing_time_ms: f64,
    pub current_load: u32,
    pub last_request_time_ms: u64,
}

impl WorkerStats {
    fn success_rate(&self) -> f64 {
        if self.request_count == 0 {
            1.0
        } else {
            self.success_count as f64 / self.request_count as f64
        }
    }

    fn weight(&self) -> f64 {
        if self.request_count == 0 {
            return 1.0;
        }
        self.success_rate() * (1000.0 / self.average_processing_time_ms.max(1.0))
    }
}

/// Completion report fed back into `LoadBalancer::record_completion`.
pub struct CompletionReport {
    pub processing_time_ms: u64,
    pub success: bool,
}

pub struct LoadBalancer {
    strategy: LoadBalancingStrategy,
    stats: DashMap<String, WorkerStats>,
    rr_cursor: Mutex<HashMap<String, usize>>,
}

impl LoadBalancer {
    pub fn new(strategy: LoadBalancingStrategy) -> Self {
        Self {
            strategy,
            stats: DashMap::new(),
            rr_cursor: Mutex::new(HashMap::new()),
        }
    }

    pub fn strategy(&self) -> LoadBalancingStrategy {
        self.strategy
    }

    pub fn stats_for(&self, worker_id: &str) -> WorkerStats {
        self.stats.get(worker_id).map(|s| *s).unwrap_or_default()
    }

    pub fn all_stats(&self) -> HashMap<String, WorkerStats> {
        self.stats.iter().map(|e| (e.key().clone(), *e.value())).collect()
    }

    /// In-flight slot acquisition: increments the orchestrator-side tracked
    /// `current_load` before dispatch. Paired with `release_in_flight` on
    /// every exit path (spec §4.4.4 step 4).
    pub fn acquire_in_flight(&self, worker_id: &str) {
        self.stats.entry(worker_id.to_string()).or_default().current_load += 1;
    }

    pub fn release_in_flight(&self, worker_id: &str) {
        if let Some(mut entry) = self.stats.get_mut(worker_id) {
            entry.current_load = entry.current_load.saturating_sub(1);
        }
    }

    /// Record the outcome of a completed request: bumps counters and
    /// recomputes the running average processing time.
    pub fn record_completion(&self, worker_id: &str, report: CompletionReport, now_ms: u64) {
        let mut entry = self.stats.entry(worker_id.to_string()).or_default();
        entry.request_count += 1;
        entry.total_processing_time_ms += report.processing_time_ms;
        entry.average_processing_time_ms = entry.total_processing_time_ms as f64 / entry.request_count as f64;
        if report.success {
            entry.success_count += 1;
        } else {
            entry.failure_count += 1;
        }
        entry.last_request_time_ms = now_ms;
    }

    /// Pick one candidate from a non-empty list. A single candidate always
    /// short-circuits regardless of strategy.
    pub fn pick<'a>(&self, candidates: &'a [WorkerRecord], key: &str) -> Option<&'a WorkerRecord> {
        if candidates.is_empty() {
            return None;
        }
        if candidates.len() == 1 {
            return Some(&candidates[0]);
        }
        match self.strategy {
            LoadBalancingStrategy::RoundRobin => self.pick_round_robin(candidates, key),
            LoadBalancingStrategy::LeastConnections => self.pick_least_connections(candidates),
            LoadBalancingStrategy::Weighted => self.pick_weighted(candidates),
            LoadBalancingStrategy::Random => self.pick_random(candidates),
        }
    }

    fn pick_round_robin<'a>(&self, candidates: &'a [WorkerRecord], key: &str) -> Option<&'a WorkerRecord> {
        let mut cursors = self.rr_cursor.lock();
        let cursor = cursors.entry(key.to_string()).or_insert(0);
        let idx = *cursor % candidates.len();
        *cursor = (*cursor + 1) % candidates.len();
        candidates.get(idx)
    }

    fn pick_least_connections<'a>(&self, candidates: &'a [WorkerRecord]) -> Option<&'a WorkerRecord> {
        candidates
            .iter()
            .min_by_key(|w| self.stats_for(&w.id).current_load)
    }

    fn pick_weighted<'a>(&self, candidates: &'a [WorkerRecord]) -> Option<&'a WorkerRecord> {
        let weights: Vec<f64> = candidates.iter().map(|w| self.stats_for(&w.id).weight()).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return candidates.first();
        }
        let mut roll = rand::thread_rng().gen_range(0.0..total);
        for (w, weight) in candidates.iter().zip(weights.iter()) {
            if roll < *weight {
                return Some(w);
            }
            roll -= weight;
        }
        candidates.last()
    }

    fn pick_random<'a>(&self, candidates: &'a [WorkerRecord]) -> Option<&'a WorkerRecord> {
        let idx = rand::thread_rng().gen_range(0..candidates.len());
        candidates.get(idx)
    }
}
