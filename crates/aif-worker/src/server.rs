//! Axum-based HTTP server exposing the worker's public contract.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness + capacity + uptime. |
//! | `POST` | `/api/inference/:modelId` | Run one inference request. |
//! | `GET`  | `/api/capacity` | Current load / availability. |
//! | `POST` | `/api/models/:modelId/load` | Preload a model (idempotent). |
//! | `POST` | `/api/models/:modelId/unload` | Evict a preloaded model. |

use crate::config::WorkerConfig;
use crate::error::{ApiError, ApiResult};
use crate::fetcher::HttpModelFetcher;
use crate::history::InferenceRecord;
use crate::pipeline;
use crate::state::WorkerState;
use aif_core::contracts::{InferenceEnvelope, InferenceRequest};
use aif_core::error::InferenceError;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct WorkerServer {
    config: WorkerConfig,
}

impl WorkerServer {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn build_app(&self) -> Router {
        let fetcher = Arc::new(HttpModelFetcher::new(self.config.model_manager_url.clone()));
        let state = WorkerState::new(self.config.clone(), fetcher);

        Router::new()
            .route("/health", get(health))
            .route("/api/inference/{model_id}", post(run_inference))
            .route("/api/capacity", get(capacity))
            .route("/api/models/{model_id}/load", post(load_model))
            .route("/api/models/{model_id}/unload", post(unload_model))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(self) -> std::io::Result<()> {
        let port = self.config.port;
        let app = self.build_app();
        let addr = format!("0.0.0.0:{port}");
        info!(addr = %addr, worker_id = %self.config.worker_id, "worker starting");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

// ─────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────

async fn health(State(state): State<WorkerState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "worker",
        "workerId": state.config.worker_id,
        "capacity": {
            "maxConcurrent": state.gate.max_concurrent(),
            "currentLoad": state.gate.current_load(),
        },
        "uptime": state.uptime_secs(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CapacityQuery {
    pub model_id: Option<String>,
}

async fn capacity(State(state): State<WorkerState>, Query(q): Query<CapacityQuery>) -> Json<Value> {
    let model_loaded = match &q.model_id {
        Some(id) => Some(state.model_cache.is_loaded(id).await),
        None => None,
    };
    Json(json!({
        "maxConcurrent": state.gate.max_concurrent(),
        "currentLoad": state.gate.current_load(),
        "available": state.gate.available(),
        "availableModels": state.model_cache.loaded_ids().await,
        "modelLoaded": model_loaded,
    }))
}

#[tracing::instrument(skip(state), fields(model_id = %model_id))]
async fn load_model(State(state): State<WorkerState>, Path(model_id): Path<String>) -> ApiResult<Json<Value>> {
    if state.model_cache.is_loaded(&model_id).await {
        return Ok(Json(json!({ "loaded": true })));
    }
    state.advertise(model_id.clone());
    state.model_cache.load(&model_id).await?;
    info!("model loaded");
    Ok(Json(json!({ "loaded": true })))
}

#[tracing::instrument(skip(state), fields(model_id = %model_id))]
async fn unload_model(State(state): State<WorkerState>, Path(model_id): Path<String>) -> Json<Value> {
    let removed = state.model_cache.unload(&model_id).await;
    Json(json!({ "unloaded": removed }))
}

#[tracing::instrument(skip(state, body), fields(model_id = %model_id))]
async fn run_inference(
    State(state): State<WorkerState>,
    Path(model_id): Path<String>,
    Json(body): Json<InferenceRequest>,
) -> ApiResult<Json<InferenceEnvelope>> {
    let started = Instant::now();

    let guard = state.gate.try_acquire().ok_or(InferenceError::CapacityExceeded)?;

    if !state.model_cache.is_loaded(&model_id).await {
        drop(guard);
        return Err(ApiError::from(InferenceError::ModelNotAvailable(model_id)));
    }

    let timeout_ms = body.options.timeout.or(Some(state.config.inference_timeout_ms));
    let result = pipeline::run_inference(&*state.predictor, body.input_data, timeout_ms, "1.0.0").await;
    drop(guard);

    let processing_time = started.elapsed().as_millis() as u64;
    let record = InferenceRecord {
        model_id: model_id.clone(),
        success: result.is_ok(),
        processing_time_ms: processing_time,
        started_at_ms: now_ms(),
    };
    state.history.push(record);

    match result {
        Ok(outcome) => Ok(Json(InferenceEnvelope {
            success: true,
            result: Some(outcome),
            error: None,
            processing_time,
        })),
        Err(err) => {
            warn!(error = %err, "inference failed");
            Err(ApiError::from(err))
        }
    }
}
