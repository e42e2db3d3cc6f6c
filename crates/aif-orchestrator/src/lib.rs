//! Orchestrator — the fleet's control plane: service registry, load
//! balancer, health monitor, RPC-client cache, and the single
//! `routeInferenceRequest` operation that ties them together (spec §4.4).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness probe |
//! | `POST` | `/api/workers/register` | Register/re-register a worker |
//! | `POST` | `/api/workers/find` | Filtered worker lookup |
//! | `POST` | `/api/inference/route` | Route + dispatch one request |
//! | `GET`  | `/api/status` | Aggregated fleet snapshot |

pub mod balancer;
pub mod config;
pub mod discovery;
pub mod error;
pub mod health;
pub mod probe;
pub mod registry;
pub mod routing;
pub mod rpc;
pub mod server;
pub mod state;

pub use config::OrchestratorConfig;
pub use error::{ApiError, ApiResult};
pub use server::OrchestratorServer;
pub use state::OrchestratorState;
