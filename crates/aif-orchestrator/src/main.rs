//! Orchestrator entry point.
//!
//! Reads configuration from a file path given in `ORCH_CONFIG` (any format
//! `aif_core::config` understands) overlaid with `ORCH_`-prefixed
//! environment variables, falling back to defaults.

use aif_orchestrator::{OrchestratorConfig, OrchestratorServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aif_orchestrator=info".parse().unwrap()))
        .init();

    let config_path = std::env::var("ORCH_CONFIG").ok();
    let config = OrchestratorConfig::load(config_path.as_deref());

    tracing::info!(
        port = config.port,
        strategy = ?config.load_balancing_strategy,
        "orchestrator configuration loaded"
    );

    let server = OrchestratorServer::new(config);
    if let Err(e) = server.start().await {
        eprintln!("orchestrator error: {e}");
        std::process::exit(1);
    }
}
