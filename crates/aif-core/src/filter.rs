//! Gateway filter-chain contract: auth and rate-limiting as composable
//! request filters rather than a hardcoded pipeline.
//!
//! A filter chain is an ordered list of [`GatewayFilter`] instances applied
//! to every inbound request. Filters run in ascending [`FilterOrder`] on the
//! request path; a `Reject` short-circuits before the request ever reaches
//! the orchestrator.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Numeric ordering slot for a filter in the chain. Filters with equal
/// order run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FilterOrder(pub u32);

impl FilterOrder {
    pub const AUTH: FilterOrder = FilterOrder(100);
    pub const RATE_LIMIT: FilterOrder = FilterOrder(200);
    pub const LOGGING: FilterOrder = FilterOrder(400);
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter '{0}' failed: {1}")]
    Failed(String, String),
}

/// Instruction returned by [`GatewayFilter::on_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterAction {
    Continue,
    Reject(u16, String),
}

/// Minimal request view a filter needs: headers, path, and a slot for the
/// resolved identity. The gateway's axum layer builds this from the real
/// `http::Request` before running the chain.
#[derive(Debug, Clone)]
pub struct FilterContext {
    pub request_id: String,
    pub path: String,
    pub client_ip: String,
    pub headers: HashMap<String, String>,
    /// Populated by the auth filter on success.
    pub principal: Option<String>,
    pub attributes: HashMap<String, Value>,
}

impl FilterContext {
    pub fn new(request_id: impl Into<String>, path: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            path: path.into(),
            client_ip: client_ip.into(),
            headers: HashMap::new(),
            principal: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }
}

/// Kernel contract for a single filter in the gateway pipeline.
#[async_trait]
pub trait GatewayFilter: Send + Sync {
    fn name(&self) -> &str;
    fn order(&self) -> FilterOrder;
    async fn on_request(&self, ctx: &mut FilterContext) -> Result<FilterAction, FilterError>;
}
