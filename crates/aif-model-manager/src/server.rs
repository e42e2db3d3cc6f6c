//! Axum-based HTTP server for the model manager.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe. |
//! | `GET` | `/api/models` | List model summaries, optionally by `type`/`limit`. |
//! | `GET` | `/api/models/:modelId` | Fetch metadata + base64 model bytes. |
//! | `POST` | `/api/models` | Store a new model (base64 body + metadata). |
//! | `DELETE` | `/api/models/:modelId` | Remove a model's metadata and blob. |
//! | `GET` | `/api/stats` | Registry and store aggregate stats. |

use crate::config::ModelManagerConfig;
use crate::handlers;
use crate::registry::ModelRegistry;
use crate::state::ModelManagerState;
use crate::store::{parse_size, ModelStore};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ModelManagerServer {
    config: ModelManagerConfig,
}

impl ModelManagerServer {
    pub fn new(config: ModelManagerConfig) -> Self {
        Self { config }
    }

    pub async fn build_app(&self) -> std::io::Result<Router> {
        let max_model_size = parse_size(&self.config.max_model_size);
        let store = ModelStore::new(&self.config.storage_dir, max_model_size).await?;
        let state = ModelManagerState::new(Arc::new(ModelRegistry::new()), Arc::new(store));

        Ok(Router::new()
            .route("/health", get(handlers::health))
            .route("/api/models", get(handlers::list_models).post(handlers::create_model))
            .route(
                "/api/models/{model_id}",
                get(handlers::get_model).delete(handlers::delete_model),
            )
            .route("/api/stats", get(handlers::stats))
            .layer(TraceLayer::new_for_http())
            .with_state(state))
    }

    pub async fn start(self) -> std::io::Result<()> {
        let app = self.build_app().await?;
        let addr = format!("0.0.0.0:{}", self.config.port);
        info!(addr = %addr, "model manager starting");
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
