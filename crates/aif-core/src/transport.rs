//! Mockable RPC boundary between the orchestrator and worker processes.
//!
//! Per the spec's design notes, orchestrator routing logic must be testable
//! without a network. [`RpcClient`] is the single narrow seam: a method
//! name, a JSON payload, and a timeout go in; a JSON payload comes back.
//! `aif-orchestrator` ships an HTTP implementation; tests use an in-process
//! one that calls a worker's handler function directly.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("call timed out after {0}ms")]
    Timeout(u64),
    #[error("remote returned malformed response: {0}")]
    Malformed(String),
}

/// A transport-agnostic RPC client bound to a single remote endpoint.
///
/// One instance is cached per worker id by the orchestrator's client cache
/// (see `aif-orchestrator::rpc_cache`); implementations should be cheap to
/// clone (wrap a pooled HTTP client in an `Arc`) since `call` may be
/// invoked concurrently by multiple in-flight requests to the same worker.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Invoke `method` on the remote with `params`, racing against `timeout_ms`.
    async fn call(&self, method: &str, params: Value, timeout_ms: u64) -> Result<Value, RpcError>;
}
