//! In-memory metadata registry for stored models.
//!
//! Mirrors the indexed-map shape used by the orchestrator's service
//! registry (`aif_core::registry::WorkerIndices`): a primary map keyed by
//! `model_id`, plus secondary indices (by type, by version) that are kept
//! in lockstep with every insert/update/delete so lookups never return a
//! dangling id.

use aif_core::contracts::{ModelMetadata, ModelMetadataPatch};
use aif_core::error::InferenceError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    pub model_count: usize,
    pub total_bytes: u64,
    pub types: HashMap<String, usize>,
}

struct Inner {
    by_id: HashMap<String, ModelMetadata>,
    by_type: HashMap<String, Vec<String>>,
}

impl Inner {
    fn index(&mut self, meta: &ModelMetadata) {
        self.by_type
            .entry(meta.model_type.clone())
            .or_default()
            .push(meta.model_id.clone());
    }

    fn unindex(&mut self, model_id: &str, model_type: &str) {
        if let Some(ids) = self.by_type.get_mut(model_type) {
            ids.retain(|id| id != model_id);
            if ids.is_empty() {
                self.by_type.remove(model_type);
            }
        }
    }
}

/// Thread-safe in-memory registry of model metadata. Does not persist
/// across restarts; rebuilding it from the store's on-disk blobs is a
/// future extension (see DESIGN.md Open Questions).
pub struct ModelRegistry {
    inner: RwLock<Inner>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_id: HashMap::new(),
                by_type: HashMap::new(),
            }),
        }
    }

    /// Insert a brand-new model. Fails if `model_id` is already registered.
    pub fn put(&self, meta: ModelMetadata) -> Result<(), InferenceError> {
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&meta.model_id) {
            return Err(InferenceError::ModelAlreadyExists(meta.model_id));
        }
        inner.index(&meta);
        inner.by_id.insert(meta.model_id.clone(), meta);
        Ok(())
    }

    pub fn get(&self, model_id: &str) -> Option<ModelMetadata> {
        self.inner.read().by_id.get(model_id).cloned()
    }

    /// Apply a partial update, bumping `updated_at` monotonically.
    pub fn update(&self, model_id: &str, patch: ModelMetadataPatch) -> Result<ModelMetadata, InferenceError> {
        let mut inner = self.inner.write();
        let old_type = inner
            .by_id
            .get(model_id)
            .map(|m| m.model_type.clone())
            .ok_or_else(|| InferenceError::ModelNotFound(model_id.to_string()))?;

        let meta = inner.by_id.get_mut(model_id).expect("checked above");
        if let Some(model_type) = patch.model_type {
            meta.model_type = model_type;
        }
        if let Some(description) = patch.description {
            meta.description = description;
        }
        if let Some(extra) = patch.extra {
            meta.extra = extra;
        }
        let new_type = meta.model_type.clone();
        let next_updated_at = meta.updated_at.max(now_ms()) + 1;
        meta.updated_at = next_updated_at;
        let updated = meta.clone();

        if old_type != new_type {
            inner.unindex(model_id, &old_type);
            inner.index(&updated);
        }

        Ok(updated)
    }

    /// Remove a model's metadata. Returns it if present.
    pub fn delete(&self, model_id: &str) -> Option<ModelMetadata> {
        let mut inner = self.inner.write();
        let meta = inner.by_id.remove(model_id)?;
        inner.unindex(model_id, &meta.model_type);
        Some(meta)
    }

    pub fn list(&self) -> Vec<ModelMetadata> {
        self.inner.read().by_id.values().cloned().collect()
    }

    pub fn list_by_type(&self, model_type: &str) -> Vec<ModelMetadata> {
        let inner = self.inner.read();
        inner
            .by_type
            .get(model_type)
            .map(|ids| ids.iter().filter_map(|id| inner.by_id.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Substring search over `model_id` and `description`.
    pub fn search(&self, query: &str) -> Vec<ModelMetadata> {
        let query = query.to_lowercase();
        self.inner
            .read()
            .by_id
            .values()
            .filter(|m| m.model_id.to_lowercase().contains(&query) || m.description.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.read();
        let mut types = HashMap::new();
        let mut total_bytes = 0u64;
        for meta in inner.by_id.values() {
            *types.entry(meta.model_type.clone()).or_insert(0usize) += 1;
            total_bytes += meta.size;
        }
        RegistryStats {
            model_count: inner.by_id.len(),
            total_bytes,
            types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, model_type: &str) -> ModelMetadata {
        ModelMetadata {
            model_id: id.to_string(),
            model_type: model_type.to_string(),
            version: "1.0.0".to_string(),
            description: format!("{id} description"),
            storage_key: format!("{id}.model"),
            checksum: "abc".to_string(),
            size: 1024,
            created_at: 0,
            updated_at: 0,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn put_rejects_duplicate_ids() {
        let reg = ModelRegistry::new();
        reg.put(meta("m1", "classifier")).unwrap();
        let err = reg.put(meta("m1", "classifier")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelAlreadyExists(_)));
    }

    #[test]
    fn type_index_stays_consistent_across_update_and_delete() {
        let reg = ModelRegistry::new();
        reg.put(meta("m1", "classifier")).unwrap();
        assert_eq!(reg.list_by_type("classifier").len(), 1);

        reg.update(
            "m1",
            ModelMetadataPatch {
                model_type: Some("regressor".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(reg.list_by_type("classifier").is_empty());
        assert_eq!(reg.list_by_type("regressor").len(), 1);

        reg.delete("m1");
        assert!(reg.list_by_type("regressor").is_empty());
    }

    #[test]
    fn update_bumps_updated_at_monotonically() {
        let reg = ModelRegistry::new();
        reg.put(meta("m1", "classifier")).unwrap();
        let first = reg.update("m1", ModelMetadataPatch::default()).unwrap();
        let second = reg.update("m1", ModelMetadataPatch::default()).unwrap();
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn search_matches_id_and_description() {
        let reg = ModelRegistry::new();
        reg.put(meta("resnet50", "classifier")).unwrap();
        reg.put(meta("bert-base", "embedding")).unwrap();
        assert_eq!(reg.search("resnet").len(), 1);
        assert_eq!(reg.search("description").len(), 2);
        assert_eq!(reg.search("nonexistent").len(), 0);
    }
}
