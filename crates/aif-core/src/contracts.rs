//! Wire-level data types shared across service boundaries.
//!
//! These types carry no behavior beyond small builder helpers — they are
//! the nouns that the gateway, orchestrator, worker, and model manager pass
//! to each other over HTTP. Keeping them in one place means a change to the
//! wire format is a one-crate diff, not four.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────
// Worker identity & capacity
// ─────────────────────────────────────────────────────────────────────────

/// Declared capacity of a worker at registration time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCapacity {
    pub max_concurrent: u32,
}

/// Health/activity status of a registered worker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    #[default]
    Active,
    Unhealthy,
}

/// Everything the orchestrator needs to know about a worker.
///
/// Sent by a worker (or its sidecar) to `POST /api/workers/register`, and
/// returned from registry queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDescriptor {
    /// Unique, immutable identity.
    pub id: String,
    /// Address the orchestrator dials to reach this worker (host:port or URL).
    pub address: String,
    /// Opaque capability tags, including every model id this worker can serve.
    pub capabilities: Vec<String>,
    pub capacity: WorkerCapacity,
}

impl WorkerDescriptor {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        capabilities: Vec<String>,
        max_concurrent: u32,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            capabilities,
            capacity: WorkerCapacity { max_concurrent },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Inference request/response envelopes
// ─────────────────────────────────────────────────────────────────────────

/// Selection constraints a caller may attach to an inference request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsFilter {
    /// All of these capability tags must be present on the candidate worker.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// The candidate worker's current load must be strictly below this value.
    #[serde(default)]
    pub min_capacity: Option<u32>,
}

/// Per-request options accepted at the gateway and threaded through to the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOptions {
    /// Execution timeout in milliseconds. Falls back to the worker's
    /// configured default, then to a hardcoded 30s.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub requirements: Option<RequirementsFilter>,
}

/// The request body forwarded from gateway → orchestrator → worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    pub model_id: String,
    pub input_data: serde_json::Value,
    #[serde(default)]
    pub options: InferenceOptions,
}

/// The normalized prediction payload a worker returns on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOutcome {
    pub predictions: serde_json::Value,
    pub confidence: f64,
    pub processing_time: u64,
}

/// Envelope returned by a worker's `runInference` RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceEnvelope {
    pub success: bool,
    pub result: Option<InferenceOutcome>,
    pub error: Option<String>,
    pub processing_time: u64,
}

// ─────────────────────────────────────────────────────────────────────────
// Model metadata (shared between model-manager and worker/orchestrator)
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub model_id: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub storage_key: String,
    pub checksum: String,
    pub size: u64,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Patch applied by `PATCH`-style registry updates. `None` fields are left
/// untouched; `model_type` changes require migrating the type index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadataPatch {
    pub model_type: Option<String>,
    pub description: Option<String>,
    pub extra: Option<HashMap<String, serde_json::Value>>,
}
