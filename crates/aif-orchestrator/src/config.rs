//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoadBalancingStrategy {
    RoundRobin,
    LeastConnections,
    Weighted,
    Random,
}

impl Default for LoadBalancingStrategy {
    fn default() -> Self {
        Self::RoundRobin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub port: u16,
    pub load_balancing_strategy: LoadBalancingStrategy,
    pub health_check_interval_ms: u64,
    pub service_discovery_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            load_balancing_strategy: LoadBalancingStrategy::RoundRobin,
            health_check_interval_ms: 5_000,
            service_discovery_interval_ms: 10_000,
            request_timeout_ms: 60_000,
        }
    }
}

impl OrchestratorConfig {
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => aif_core::config::load_with_env(path, "ORCH").unwrap_or_else(|err| {
                tracing::warn!(error = %err, path, "falling back to default orchestrator config");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.load_balancing_strategy, LoadBalancingStrategy::RoundRobin);
        assert_eq!(cfg.health_check_interval_ms, 5_000);
    }
}
