//! Shared application state for the model manager server.

use crate::registry::ModelRegistry;
use crate::store::ModelStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct ModelManagerState {
    pub registry: Arc<ModelRegistry>,
    pub store: Arc<ModelStore>,
}

impl ModelManagerState {
    pub fn new(registry: Arc<ModelRegistry>, store: Arc<ModelStore>) -> Self {
        Self { registry, store }
    }
}
