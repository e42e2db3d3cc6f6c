//! Axum-based HTTP server exposing the gateway's authenticated edge
//! (spec §6):
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness probe. |
//! | `POST` | `/api/v1/inference/{modelId}` | Authenticate, rate-limit, route an inference request. |
//! | `GET`  | `/api/v1/models` | List model summaries (forwarded to the model manager). |
//! | `GET`  | `/api/v1/models/{modelId}` | Fetch one model's metadata. |
//! | `POST` | `/api/v1/models` | Store a new model. |
//! | `GET`  | `/api/v1/status` | Aggregated health across orchestrator + model manager. |
//!
//! Authentication and rate limiting run as an [`aif_core::filter`] chain in
//! front of every `/api/v1/*` route; everything past that point is a thin
//! forward to the orchestrator or model manager (see [`crate::clients`]).

use crate::config::GatewayConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::GatewayState;
use aif_core::contracts::{InferenceOptions, InferenceRequest};
use aif_core::error::InferenceError;
use aif_core::filter::{FilterAction, FilterContext};
use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Query, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub struct GatewayServer {
    config: GatewayConfig,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn build_app(&self) -> (Router, GatewayState) {
        let state = GatewayState::new(self.config.clone());
        let app = Router::new()
            .route("/health", get(health))
            .route("/api/v1/inference/{model_id}", post(inference))
            .route("/api/v1/models", get(list_models).post(create_model))
            .route("/api/v1/models/{model_id}", get(get_model))
            .route("/api/v1/status", get(status))
            .layer(middleware::from_fn_with_state(state.clone(), filter_chain))
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());
        (app, state)
    }

    pub async fn start(self) -> std::io::Result<()> {
        let port = self.config.port;
        let (app, state) = self.build_app();

        spawn_rate_limiter_gc(state.clone());

        let addr = format!("0.0.0.0:{port}");
        info!(addr = %addr, "gateway starting");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

/// GC loop every 60s (spec §4.5), pruning rate-limit windows idle longer
/// than `2 * windowMs`.
fn spawn_rate_limiter_gc(state: GatewayState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            state.rate_limit.gc_tick();
        }
    });
}

/// Runs the auth + rate-limit filter chain ahead of every route, mapping a
/// `Reject` into a terminal HTTP response before the handler ever runs.
async fn filter_chain(State(state): State<GatewayState>, req: Request<Body>, next: Next) -> Response {
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let path = req.uri().path().to_string();
    let mut ctx = FilterContext::new(Uuid::new_v4().to_string(), path, client_ip);
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            ctx = ctx.with_header(name.as_str(), v);
        }
    }

    match state.filters.run(&mut ctx).await {
        Ok(FilterAction::Continue) => next.run(req).await,
        Ok(FilterAction::Reject(status, message)) => {
            let code = axum::http::StatusCode::from_u16(status).unwrap_or(axum::http::StatusCode::FORBIDDEN);
            (code, Json(json!({ "error": { "message": message } }))).into_response()
        }
        Err(err) => {
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": { "message": err.to_string() } })))
                .into_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────

async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gateway",
        "uptime": state.uptime_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct InferenceBody {
    #[serde(rename = "inputData")]
    pub input_data: Option<Value>,
    #[serde(default)]
    pub options: InferenceOptions,
}

async fn inference(
    State(state): State<GatewayState>,
    Path(model_id): Path<String>,
    Json(body): Json<InferenceBody>,
) -> ApiResult<Json<Value>> {
    let Some(input_data) = body.input_data else {
        return Err(InferenceError::BadRequest("inputData is required".to_string()).into());
    };

    let request = InferenceRequest { model_id: model_id.clone(), input_data, options: body.options };
    let routed = state
        .orchestrator
        .route_inference(serde_json::to_value(&request).unwrap_or_default())
        .await?;

    let result = routed.get("result").cloned().unwrap_or(Value::Null);
    let worker_id = routed.get("workerId").cloned().unwrap_or(Value::Null);

    Ok(Json(json!({
        "success": true,
        "modelId": model_id,
        "result": result,
        "workerId": worker_id,
        "timestamp": now_ms(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListModelsQuery {
    #[serde(rename = "type")]
    pub model_type: Option<String>,
    pub limit: Option<usize>,
}

async fn list_models(State(state): State<GatewayState>, Query(query): Query<ListModelsQuery>) -> ApiResult<Json<Value>> {
    let upstream = state.model_manager.list_models(query.model_type.as_deref(), query.limit).await?;
    Ok(Json(upstream))
}

async fn get_model(State(state): State<GatewayState>, Path(model_id): Path<String>) -> ApiResult<Json<Value>> {
    let upstream = state.model_manager.get_model(&model_id).await?;
    let metadata = upstream.get("metadata").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({
        "success": true,
        "model": {
            "modelId": model_id,
            "type": metadata.get("type").cloned().unwrap_or(Value::Null),
            "version": metadata.get("version").cloned().unwrap_or(Value::Null),
            "description": metadata.get("description").cloned().unwrap_or(Value::Null),
            "metadata": metadata,
            "status": "available",
        },
        "timestamp": now_ms(),
    })))
}

async fn create_model(State(state): State<GatewayState>, Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    let model_id = body.get("modelId").cloned().unwrap_or(Value::Null);
    let upstream = state.model_manager.create_model(body).await?;
    let result = upstream.get("result").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({
        "success": true,
        "modelId": model_id,
        "result": result,
        "timestamp": now_ms(),
    })))
}

async fn status(State(state): State<GatewayState>) -> Json<Value> {
    let orchestrator = state.orchestrator.status().await.unwrap_or_else(|e| json!({ "error": e.to_string() }));
    let model_manager = state.model_manager.health().await.unwrap_or_else(|e| json!({ "error": e.to_string() }));
    Json(json!({
        "gateway": { "status": "ok", "uptime": state.uptime_secs() },
        "orchestrator": orchestrator,
        "modelManager": model_manager,
        "timestamp": now_ms(),
    }))
}
