//! Inference Worker — per-process executor for preloaded models.
//!
//! Owns a concurrency gate ([`capacity`]), a single-flight local model cache
//! ([`model_cache`]) fed by the Model Manager ([`fetcher`]), a validate →
//! preprocess → execute-with-timeout → postprocess pipeline ([`pipeline`]),
//! and a bounded rolling history of past attempts ([`history`]).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness, capacity, uptime |
//! | `POST` | `/api/inference/{id}` | Run one inference request |
//! | `GET`  | `/api/capacity` | Current load / availability |
//! | `POST` | `/api/models/{id}/load` | Preload a model (idempotent) |
//! | `POST` | `/api/models/{id}/unload` | Evict a preloaded model |

pub mod capacity;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod model_cache;
pub mod pipeline;
pub mod server;
pub mod state;

pub use config::WorkerConfig;
pub use error::{ApiError, ApiResult};
pub use server::WorkerServer;
pub use state::WorkerState;
