//! Axum-based HTTP server exposing the orchestrator's control-plane
//! surface (spec §6):
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness probe. |
//! | `POST` | `/api/workers/register` | Register (or re-register) a worker. |
//! | `POST` | `/api/workers/find` | Filtered worker lookup, no dispatch. |
//! | `POST` | `/api/inference/route` | Route + dispatch one inference request. |
//! | `GET`  | `/api/status` | Aggregated registry/balancer/health snapshot. |
//!
//! Also spawns the two background loops the spec names as orchestrator
//! singletons: the service-discovery tick and the health-check tick.

use crate::config::OrchestratorConfig;
use crate::error::{ApiError, ApiResult};
use crate::registry::record_from;
use crate::routing;
use crate::state::OrchestratorState;
use aif_core::contracts::{InferenceRequest, RequirementsFilter, WorkerDescriptor};
use aif_core::error::InferenceError;
use aif_core::registry::{ServiceRegistry, WorkerStatusPatch};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower_http::trace::TraceLayer;
use tracing::info;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct OrchestratorServer {
    config: OrchestratorConfig,
}

impl OrchestratorServer {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn build_app(&self) -> (Router, OrchestratorState) {
        let state = OrchestratorState::new(self.config.clone());
        let app = Router::new()
            .route("/health", get(health))
            .route("/api/workers/register", post(register_worker))
            .route("/api/workers/find", post(find_workers))
            .route("/api/inference/route", post(route_inference))
            .route("/api/status", get(status))
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());
        (app, state)
    }

    pub async fn start(self) -> std::io::Result<()> {
        let port = self.config.port;
        let (app, state) = self.build_app();

        spawn_health_loop(state.clone());
        spawn_discovery_loop(state.clone());

        let addr = format!("0.0.0.0:{port}");
        info!(addr = %addr, strategy = ?state.balancer.strategy(), "orchestrator starting");
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

/// Health-check tick: a singleton background task per orchestrator
/// instance, cadence `health_check_interval_ms`.
fn spawn_health_loop(state: OrchestratorState) {
    let interval_ms = state.config.health_check_interval_ms;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            ticker.tick().await;
            state.health.tick(now_ms()).await;
        }
    });
}

/// Service-discovery tick: refreshes the registry from the pluggable
/// discovery oracle, cadence `service_discovery_interval_ms`.
fn spawn_discovery_loop(state: OrchestratorState) {
    let interval_ms = state.config.service_discovery_interval_ms;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            ticker.tick().await;
            let now = now_ms();
            for descriptor in state.discovery.discover().await {
                state.registry.register(record_from(
                    &descriptor.id,
                    &descriptor.address,
                    descriptor.capabilities,
                    descriptor.capacity.max_concurrent,
                    now,
                ));
            }
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────

async fn health(State(state): State<OrchestratorState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "orchestrator",
        "uptime": state.uptime_secs(),
    }))
}

#[tracing::instrument(skip(state, descriptor), fields(worker_id = %descriptor.id))]
async fn register_worker(
    State(state): State<OrchestratorState>,
    Json(descriptor): Json<WorkerDescriptor>,
) -> Json<Value> {
    let now = now_ms();
    let existing = state.registry.get(&descriptor.id).is_some();
    state.registry.register(record_from(
        &descriptor.id,
        &descriptor.address,
        descriptor.capabilities.clone(),
        descriptor.capacity.max_concurrent,
        now,
    ));
    info!(reregistered = existing, "worker registered");
    Json(json!({ "success": true, "workerId": descriptor.id, "reregistered": existing }))
}

#[derive(Debug, Deserialize)]
pub struct FindRequest {
    pub model_id: String,
    #[serde(default)]
    pub requirements: Option<RequirementsFilter>,
}

async fn find_workers(State(state): State<OrchestratorState>, Json(req): Json<FindRequest>) -> ApiResult<Json<Value>> {
    let mut candidates = state.registry.workers_for_model(&req.model_id);
    if let Some(requirements) = &req.requirements {
        candidates.retain(|w| requirements.capabilities.iter().all(|tag| w.capabilities.contains(tag)));
        if let Some(min) = requirements.min_capacity {
            candidates.retain(|w| state.balancer.stats_for(&w.id).current_load < min);
        }
    }
    if candidates.is_empty() {
        return Err(ApiError::from(InferenceError::NoWorkersAvailable(req.model_id)));
    }
    let workers: Vec<Value> = candidates
        .iter()
        .map(|w| {
            json!({
                "id": w.id,
                "address": w.address,
                "capabilities": w.capabilities,
                "maxConcurrent": w.capacity.max_concurrent,
                "currentLoad": state.balancer.stats_for(&w.id).current_load,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "workers": workers })))
}

async fn route_inference(
    State(state): State<OrchestratorState>,
    Json(request): Json<InferenceRequest>,
) -> ApiResult<Json<Value>> {
    let result = routing::route_inference_request(
        &*state.registry,
        &state.balancer,
        &state.rpc_cache,
        request,
        state.config.request_timeout_ms,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(json!({
        "success": true,
        "result": result.response,
        "workerId": result.worker_id,
        "routedAt": result.routed_at,
    })))
}

async fn status(State(state): State<OrchestratorState>) -> Json<Value> {
    let workers = state.registry.list_all();
    let healthy_count = workers.iter().filter(|w| w.status == aif_core::contracts::WorkerStatus::Active).count();
    let workers_json: Vec<Value> = workers
        .iter()
        .map(|w| {
            let stats = state.balancer.stats_for(&w.id);
            json!({
                "id": w.id,
                "status": w.status,
                "currentLoad": stats.current_load,
                "maxConcurrent": w.capacity.max_concurrent,
            })
        })
        .collect();

    Json(json!({
        "workers": workers_json,
        "strategy": state.balancer.strategy(),
        "healthyCount": healthy_count,
        "totalCount": workers.len(),
    }))
}

/// Explicit unregister, not in the spec's named HTTP surface but needed so
/// the RPC-client cache's "closed on unregisterWorker" contract (§4.4.4)
/// has a caller; exposed for operator tooling / tests.
pub async fn unregister_worker(state: &OrchestratorState, worker_id: &str) -> bool {
    let removed = state.registry.unregister(worker_id);
    if removed {
        state.rpc_cache.evict(worker_id);
    }
    removed
}

#[allow(dead_code)]
async fn update_worker_status(state: &OrchestratorState, worker_id: &str, patch: WorkerStatusPatch) -> bool {
    state.registry.update_status(worker_id, patch, now_ms())
}
