//! Worker configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub port: u16,
    pub worker_id: String,
    pub max_concurrent_inferences: u32,
    pub inference_timeout_ms: u64,
    pub model_cache_size: usize,
    pub health_check_interval_ms: u64,
    pub model_manager_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            port: 3003,
            worker_id: "worker-1".to_string(),
            max_concurrent_inferences: 10,
            inference_timeout_ms: 30_000,
            model_cache_size: 10_000,
            health_check_interval_ms: 5_000,
            model_manager_url: "http://localhost:3002".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => aif_core::config::load_with_env(path, "WORKER").unwrap_or_else(|err| {
                tracing::warn!(error = %err, path, "falling back to default worker config");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
