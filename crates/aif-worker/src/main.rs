//! Inference worker entry point.
//!
//! Reads configuration from a file path given in `WORKER_CONFIG` (any
//! format `aif_core::config` understands) overlaid with `WORKER_`-prefixed
//! environment variables, falling back to defaults.

use aif_worker::{WorkerConfig, WorkerServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aif_worker=info".parse().unwrap()))
        .init();

    let config_path = std::env::var("WORKER_CONFIG").ok();
    let config = WorkerConfig::load(config_path.as_deref());

    tracing::info!(
        port = config.port,
        worker_id = %config.worker_id,
        max_concurrent = config.max_concurrent_inferences,
        "worker configuration loaded"
    );

    let server = WorkerServer::new(config);
    if let Err(e) = server.start().await {
        eprintln!("worker error: {e}");
        std::process::exit(1);
    }
}
