//! Model Manager — content-addressed storage and metadata registry for
//! inference models.
//!
//! # Endpoints
//!
//! | Method   | Path                  | Description                       |
//! |----------|-----------------------|------------------------------------|
//! | `GET`    | `/health`             | Liveness probe                    |
//! | `GET`    | `/api/models`         | List model summaries              |
//! | `GET`    | `/api/models/{id}`    | Fetch metadata + base64 bytes     |
//! | `POST`   | `/api/models`         | Store a new model                 |
//! | `DELETE` | `/api/models/{id}`    | Remove a model                    |
//! | `GET`    | `/api/stats`          | Store/registry aggregate stats    |

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod state;
pub mod store;

pub use config::ModelManagerConfig;
pub use error::{ApiError, ApiResult};
pub use registry::ModelRegistry;
pub use server::ModelManagerServer;
pub use store::ModelStore;
