//! Axum handlers implementing the Model Manager HTTP surface:
//! `GET /health`, `GET /api/models`, `GET /api/models/:modelId`,
//! `POST /api/models`.

use crate::error::{ApiError, ApiResult};
use crate::state::ModelManagerState;
use aif_core::contracts::ModelMetadata;
use aif_core::error::InferenceError;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "model-manager",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListModelsQuery {
    #[serde(rename = "type")]
    pub model_type: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_models(
    State(state): State<ModelManagerState>,
    Query(query): Query<ListModelsQuery>,
) -> Json<Value> {
    let mut models = match &query.model_type {
        Some(model_type) => state.registry.list_by_type(model_type),
        None => state.registry.list(),
    };
    models.sort_by(|a, b| a.model_id.cmp(&b.model_id));
    if let Some(limit) = query.limit {
        models.truncate(limit);
    }

    let count = models.len();
    let summaries: Vec<Value> = models
        .into_iter()
        .map(|m| {
            json!({
                "modelId": m.model_id,
                "type": m.model_type,
                "version": m.version,
                "description": m.description,
                "createdAt": m.created_at,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "models": summaries,
        "count": count,
        "timestamp": now_ms(),
    }))
}

pub async fn get_model(
    State(state): State<ModelManagerState>,
    Path(model_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let meta = state
        .registry
        .get(&model_id)
        .ok_or_else(|| InferenceError::ModelNotFound(model_id.clone()))?;

    let bytes = state
        .store
        .fetch(&meta.storage_key)
        .await
        .map_err(|_| InferenceError::ModelNotFound(model_id.clone()))?;
    let model_data = base64::engine::general_purpose::STANDARD.encode(bytes);

    Ok(Json(json!({
        "modelId": meta.model_id,
        "metadata": metadata_json(&meta),
        "modelData": model_data,
    })))
}

fn metadata_json(meta: &ModelMetadata) -> Value {
    json!({
        "modelId": meta.model_id,
        "type": meta.model_type,
        "version": meta.version,
        "description": meta.description,
        "storageKey": meta.storage_key,
        "checksum": meta.checksum,
        "size": meta.size,
        "createdAt": meta.created_at,
        "updatedAt": meta.updated_at,
        "extra": meta.extra,
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub model_id: String,
    pub model_data: String,
    #[serde(default)]
    pub metadata: CreateModelMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateModelMetadata {
    #[serde(rename = "type", default = "default_model_type")]
    pub model_type: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

fn default_model_type() -> String {
    "generic".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Serialize)]
struct CreateModelResult {
    status: &'static str,
    size: u64,
    checksum: String,
    created_at: u64,
}

pub async fn create_model(
    State(state): State<ModelManagerState>,
    Json(req): Json<CreateModelRequest>,
) -> ApiResult<Json<Value>> {
    if req.model_id.trim().is_empty() {
        return Err(InferenceError::BadRequest("modelId must not be empty".to_string()).into());
    }
    if state.registry.get(&req.model_id).is_some() {
        return Err(InferenceError::ModelAlreadyExists(req.model_id).into());
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(req.model_data.as_bytes())
        .map_err(|e| InferenceError::InvalidModelData(e.to_string()))?;

    let receipt = state.store.store(&req.model_id, &bytes).await.map_err(|err| {
        use crate::store::StoreError;
        match err {
            StoreError::TooLarge { .. } => InferenceError::ModelTooLarge(bytes.len()),
            other => InferenceError::InvalidModelData(other.to_string()),
        }
    })?;

    let now = now_ms();
    let meta = ModelMetadata {
        model_id: req.model_id.clone(),
        model_type: req.metadata.model_type,
        version: req.metadata.version,
        description: req.metadata.description,
        storage_key: receipt.storage_key.clone(),
        checksum: receipt.checksum.clone(),
        size: receipt.size,
        created_at: now,
        updated_at: now,
        extra: Default::default(),
    };

    state.registry.put(meta).map_err(ApiError::from)?;

    Ok(Json(json!({
        "success": true,
        "modelId": req.model_id,
        "result": CreateModelResult {
            status: "stored",
            size: receipt.size,
            checksum: receipt.checksum,
            created_at: now,
        },
        "timestamp": now,
    })))
}

pub async fn delete_model(
    State(state): State<ModelManagerState>,
    Path(model_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let meta = state
        .registry
        .delete(&model_id)
        .ok_or_else(|| InferenceError::ModelNotFound(model_id.clone()))?;
    state.store.delete(&meta.storage_key).await;
    Ok(Json(json!({ "success": true, "modelId": model_id })))
}

pub async fn stats(State(state): State<ModelManagerState>) -> ApiResult<Json<Value>> {
    let registry_stats = state.registry.stats();
    let store_stats = state
        .store
        .stats()
        .await
        .map_err(|e| InferenceError::ExecutionError(e.to_string()))?;
    Ok(Json(json!({
        "modelCount": registry_stats.model_count,
        "totalBytes": registry_stats.total_bytes,
        "types": registry_stats.types,
        "store": {
            "fileCount": store_stats.file_count,
            "totalBytes": store_stats.total_bytes,
            "maxModelSize": store_stats.max_model_size,
        },
    })))
}
