//! Shared application state for one worker process.

use crate::capacity::CapacityGate;
use crate::config::WorkerConfig;
use crate::history::History;
use crate::model_cache::{ModelCache, ModelFetcher};
use crate::pipeline::{Predictor, SyntheticPredictor};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// A worker is a single process; `WorkerState` is everything its handlers
/// need, shared via axum's `State` extractor.
#[derive(Clone)]
pub struct WorkerState {
    pub config: Arc<WorkerConfig>,
    pub gate: Arc<CapacityGate>,
    pub model_cache: Arc<ModelCache>,
    pub history: Arc<History>,
    pub predictor: Arc<dyn Predictor>,
    /// `capabilities.models` — the set a worker was registered with, not
    /// necessarily preloaded yet. `preloadedModels` lives in `model_cache`.
    pub advertised_models: Arc<RwLock<HashSet<String>>>,
    pub started_at: Instant,
}

impl WorkerState {
    pub fn new(config: WorkerConfig, fetcher: Arc<dyn ModelFetcher>) -> Self {
        let gate = CapacityGate::new(config.max_concurrent_inferences);
        let history = Arc::new(History::new(config.model_cache_size.max(1)));
        Self {
            config: Arc::new(config),
            gate,
            model_cache: Arc::new(ModelCache::new(fetcher)),
            history,
            predictor: Arc::new(SyntheticPredictor),
            advertised_models: Arc::new(RwLock::new(HashSet::new())),
            started_at: Instant::now(),
        }
    }

    pub fn advertise(&self, model_id: impl Into<String>) {
        self.advertised_models.write().insert(model_id.into());
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
