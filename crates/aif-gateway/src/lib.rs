//! Gateway — the fleet's authenticated edge: API-key auth, a per-client
//! sliding-window rate limiter, and a thin forward to the orchestrator and
//! model manager (spec §4.5, §6).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness probe |
//! | `POST` | `/api/v1/inference/{modelId}` | Authenticated, rate-limited inference |
//! | `GET`  | `/api/v1/models` | List model summaries |
//! | `GET`  | `/api/v1/models/{modelId}` | Fetch one model's metadata |
//! | `POST` | `/api/v1/models` | Store a new model |
//! | `GET`  | `/api/v1/status` | Aggregated fleet health |

pub mod clients;
pub mod config;
pub mod error;
pub mod filters;
pub mod keystore;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ApiResult};
pub use server::GatewayServer;
pub use state::GatewayState;
