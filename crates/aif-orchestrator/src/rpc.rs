//! RPC-client cache: one [`RpcClient`] per worker id, created lazily and
//! closed on unregister or unrecoverable transport failure.

use aif_core::transport::{RpcClient, RpcError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// HTTP transport: `call("runInference", params, timeout)` POSTs to
/// `{address}/api/inference/{modelId}` on the worker. Other method names
/// are reserved for future RPCs and currently unsupported.
pub struct HttpRpcClient {
    client: reqwest::Client,
    address: String,
}

impl HttpRpcClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            address: address.into(),
        }
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn call(&self, method: &str, params: Value, timeout_ms: u64) -> Result<Value, RpcError> {
        if method != "runInference" {
            return Err(RpcError::Malformed(format!("unsupported method '{method}'")));
        }
        let model_id = params
            .get("modelId")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::Malformed("params missing modelId".to_string()))?;
        let url = format!("{}/api/inference/{}", self.address.trim_end_matches('/'), model_id);

        let response = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.client.post(&url).json(&params).send(),
        )
        .await
        .map_err(|_| RpcError::Timeout(timeout_ms))?
        .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(RpcError::Transport(format!("worker returned {status}: {body}")));
        }
        Ok(body)
    }
}

/// Caches one client per worker id. Tests inject `RpcClient` stubs via
/// `insert`; production code lazily creates `HttpRpcClient`s via
/// `get_or_create`.
pub struct RpcClientCache {
    clients: DashMap<String, Arc<dyn RpcClient>>,
}

impl Default for RpcClientCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcClientCache {
    pub fn new() -> Self {
        Self { clients: DashMap::new() }
    }

    pub fn get_or_create(&self, worker_id: &str, address: &str) -> Arc<dyn RpcClient> {
        if let Some(client) = self.clients.get(worker_id) {
            return client.clone();
        }
        let client: Arc<dyn RpcClient> = Arc::new(HttpRpcClient::new(address));
        self.clients.insert(worker_id.to_string(), client.clone());
        client
    }

    pub fn insert(&self, worker_id: &str, client: Arc<dyn RpcClient>) {
        self.clients.insert(worker_id.to_string(), client);
    }

    /// Drop a worker's cached client. Called on unregister or after a
    /// transport failure so the next call re-creates it fresh.
    pub fn evict(&self, worker_id: &str) {
        self.clients.remove(worker_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_reuses_the_same_client_instance() {
        let cache = RpcClientCache::new();
        let a = cache.get_or_create("w1", "http://w1");
        let b = cache.get_or_create("w1", "http://w1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn evict_forces_a_fresh_client_on_next_call() {
        let cache = RpcClientCache::new();
        let a = cache.get_or_create("w1", "http://w1");
        cache.evict("w1");
        let b = cache.get_or_create("w1", "http://w1");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
