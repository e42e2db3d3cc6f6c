//! Shared application state for the gateway process.

use crate::clients::{ModelManagerClient, OrchestratorClient};
use crate::config::GatewayConfig;
use crate::filters::{ApiKeyFilter, FilterChain, RateLimitFilter};
use crate::keystore::{ApiKey, Keystore};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub keystore: Arc<Keystore>,
    pub filters: Arc<FilterChain>,
    pub rate_limit: Arc<RateLimitFilter>,
    pub orchestrator: Arc<OrchestratorClient>,
    pub model_manager: Arc<ModelManagerClient>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        let keystore = Arc::new(Keystore::new());
        for seed in &config.api_keys {
            keystore.issue(ApiKey::new(seed.key.clone(), seed.name.clone(), seed.permissions.clone()));
        }

        let rate_limit = Arc::new(RateLimitFilter::new(
            config.rate_limit.window_ms,
            config.rate_limit.max_requests,
            config.rate_limit.enabled,
        ));
        let auth = Arc::new(ApiKeyFilter::new(keystore.clone(), config.authentication.enabled));
        let filters = Arc::new(FilterChain::new(vec![auth, rate_limit.clone()]));

        let orchestrator = Arc::new(OrchestratorClient::new(&config.orchestrator_url, config.request_timeout_ms));
        let model_manager = Arc::new(ModelManagerClient::new(&config.model_manager_url, config.request_timeout_ms));

        Self {
            config: Arc::new(config),
            keystore,
            filters,
            rate_limit,
            orchestrator,
            model_manager,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
