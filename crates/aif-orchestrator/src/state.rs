//! Shared application state for the orchestrator process.

use crate::balancer::LoadBalancer;
use crate::config::OrchestratorConfig;
use crate::discovery::{DiscoverySource, NoopDiscovery};
use crate::health::HealthMonitor;
use crate::probe::HttpHealthProbe;
use crate::registry::InMemoryServiceRegistry;
use crate::rpc::RpcClientCache;
use aif_core::registry::ServiceRegistry;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct OrchestratorState {
    pub config: Arc<OrchestratorConfig>,
    pub registry: Arc<dyn ServiceRegistry>,
    pub balancer: Arc<LoadBalancer>,
    pub health: Arc<HealthMonitor>,
    pub rpc_cache: Arc<RpcClientCache>,
    pub discovery: Arc<dyn DiscoverySource>,
    pub started_at: Instant,
}

impl OrchestratorState {
    pub fn new(config: OrchestratorConfig) -> Self {
        let registry: Arc<dyn ServiceRegistry> = Arc::new(InMemoryServiceRegistry::new());
        let balancer = Arc::new(LoadBalancer::new(config.load_balancing_strategy));
        let health = Arc::new(HealthMonitor::new(registry.clone(), Arc::new(HttpHealthProbe::new())));
        Self {
            config: Arc::new(config),
            registry,
            balancer,
            health,
            rpc_cache: Arc::new(RpcClientCache::new()),
            discovery: Arc::new(NoopDiscovery),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
