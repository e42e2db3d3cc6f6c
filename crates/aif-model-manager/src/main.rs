//! Model manager entry point.
//!
//! Reads configuration from a file path given in `MODELMGR_CONFIG`
//! (any format `aif_core::config` understands) overlaid with
//! `MODELMGR_`-prefixed environment variables, falling back to defaults.

use aif_model_manager::{ModelManagerConfig, ModelManagerServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aif_model_manager=info".parse().unwrap()))
        .init();

    let config_path = std::env::var("MODELMGR_CONFIG").ok();
    let config = ModelManagerConfig::load(config_path.as_deref());

    tracing::info!(port = config.port, storage_dir = %config.storage_dir, "model manager configuration loaded");

    let server = ModelManagerServer::new(config);
    if let Err(e) = server.start().await {
        eprintln!("model manager error: {e}");
        std::process::exit(1);
    }
}
