//! Gateway configuration (spec §6): `{port, authentication:{enabled},
//! rateLimit:{enabled, windowMs, maxRequests}, cors:{origins}}`, plus the
//! two upstream addresses this crate's teacher never needed — the
//! orchestrator and model manager this gateway forwards to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthenticationConfig {
    pub enabled: bool,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_ms: u64,
    pub max_requests: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true, window_ms: 60_000, max_requests: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsConfig {
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { origins: vec!["*".to_string()] }
    }
}

/// A key seeded into the gateway's in-memory keystore at startup. Real
/// issuance/revocation happens through the keystore API; this is only how
/// an operator bootstraps the first key(s) from config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySeed {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    pub port: u16,
    pub authentication: AuthenticationConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub orchestrator_url: String,
    pub model_manager_url: String,
    pub request_timeout_ms: u64,
    pub api_keys: Vec<ApiKeySeed>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            authentication: AuthenticationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            orchestrator_url: "http://127.0.0.1:3001".to_string(),
            model_manager_url: "http://127.0.0.1:3002".to_string(),
            request_timeout_ms: 60_000,
            api_keys: Vec::new(),
        }
    }
}

impl GatewayConfig {
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => aif_core::config::load_with_env(path, "GATEWAY").unwrap_or_else(|err| {
                tracing::warn!(error = %err, path, "falling back to default gateway config");
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
        let cfg = GatewayConfig::default();
        assert!(cfg.authentication.enabled);
        assert!(cfg.rate_limit.enabled);
        assert_eq!(cfg.rate_limit.window_ms, 60_000);
        assert_eq!(cfg.rate_limit.max_requests, 100);
    }
}
