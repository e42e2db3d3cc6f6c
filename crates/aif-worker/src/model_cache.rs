//! Local model cache with single-flight loading.
//!
//! Concurrent `loadModel(id)` calls for the same id must share one
//! underlying fetch from the Model Manager rather than racing to fetch the
//! same bytes twice. Each model id gets its own `OnceCell`; the outer map
//! only needs locking long enough to find-or-insert that cell.

use aif_core::error::InferenceError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model_id: String,
    pub bytes: Arc<Vec<u8>>,
    pub checksum: String,
}

type Slot = Arc<OnceCell<Result<LoadedModel, String>>>;

/// Fetches a model's bytes from the model manager. Implemented with
/// `reqwest` in `main.rs`/`server.rs`; kept behind a trait so tests can
/// supply an in-memory fetcher without a network.
#[async_trait::async_trait]
pub trait ModelFetcher: Send + Sync {
    async fn fetch(&self, model_id: &str) -> Result<(Vec<u8>, String), String>;
}

pub struct ModelCache {
    slots: Mutex<HashMap<String, Slot>>,
    fetcher: Arc<dyn ModelFetcher>,
}

impl ModelCache {
    pub fn new(fetcher: Arc<dyn ModelFetcher>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            fetcher,
        }
    }

    /// Idempotent: the first caller for a given `model_id` performs the
    /// fetch; everyone else awaits the same result.
    pub async fn load(&self, model_id: &str) -> Result<LoadedModel, InferenceError> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(model_id.to_string()).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        let result = slot
            .get_or_init(|| async {
                self.fetcher
                    .fetch(model_id)
                    .await
                    .map(|(bytes, checksum)| LoadedModel {
                        model_id: model_id.to_string(),
                        bytes: Arc::new(bytes),
                        checksum,
                    })
            })
            .await;

        match result {
            Ok(loaded) => Ok(loaded.clone()),
            Err(message) => {
                // A failed load must not poison the cache for a future retry:
                // drop the failed slot so the next `load` call fetches again.
                self.slots.lock().await.remove(model_id);
                Err(InferenceError::ExecutionError(message.clone()))
            }
        }
    }

    pub async fn unload(&self, model_id: &str) -> bool {
        self.slots.lock().await.remove(model_id).is_some()
    }

    pub async fn is_loaded(&self, model_id: &str) -> bool {
        match self.slots.lock().await.get(model_id) {
            Some(slot) => matches!(slot.get(), Some(Ok(_))),
            None => false,
        }
    }

    pub async fn loaded_ids(&self) -> Vec<String> {
        let slots = self.slots.lock().await;
        let mut ids = Vec::new();
        for (id, slot) in slots.iter() {
            if matches!(slot.get(), Some(Ok(_))) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ModelFetcher for CountingFetcher {
        async fn fetch(&self, model_id: &str) -> Result<(Vec<u8>, String), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok((format!("bytes-for-{model_id}").into_bytes(), "checksum".to_string()))
        }
    }

    #[tokio::test]
    async fn concurrent_loads_of_the_same_model_share_one_fetch() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0) });
        let cache = Arc::new(ModelCache::new(fetcher.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.load("m1").await.unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded("m1").await);
    }

    #[tokio::test]
    async fn unload_removes_from_loaded_set() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0) });
        let cache = ModelCache::new(fetcher);
        cache.load("m1").await.unwrap();
        assert!(cache.unload("m1").await);
        assert!(!cache.is_loaded("m1").await);
    }

    struct FailingFetcher;

    #[async_trait::async_trait]
    impl ModelFetcher for FailingFetcher {
        async fn fetch(&self, _model_id: &str) -> Result<(Vec<u8>, String), String> {
            Err("model manager unreachable".to_string())
        }
    }

    #[tokio::test]
    async fn a_failed_load_can_be_retried() {
        let cache = ModelCache::new(Arc::new(FailingFetcher));
        assert!(cache.load("m1").await.is_err());
        assert!(cache.load("m1").await.is_err());
        assert!(!cache.is_loaded("m1").await);
    }
}
