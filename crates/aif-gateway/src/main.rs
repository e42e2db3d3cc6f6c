//! Gateway entry point.
//!
//! Reads configuration from a file path given in `GATEWAY_CONFIG` (any
//! format `aif_core::config` understands) overlaid with `GATEWAY_`-prefixed
//! environment variables, falling back to defaults.

use aif_gateway::{GatewayConfig, GatewayServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aif_gateway=info".parse().unwrap()))
        .init();

    let config_path = std::env::var("GATEWAY_CONFIG").ok();
    let config = GatewayConfig::load(config_path.as_deref());

    tracing::info!(
        port = config.port,
        auth_enabled = config.authentication.enabled,
        rate_limit_enabled = config.rate_limit.enabled,
        "gateway configuration loaded"
    );

    let server = GatewayServer::new(config);
    if let Err(e) = server.start().await {
        eprintln!("gateway error: {e}");
        std::process::exit(1);
    }
}
