//! Authentication filter (spec §4.5): extract an API key from
//! `X-Api-Key` or `Authorization: Bearer <key>`, look it up in the
//! keystore, and attach `{name, permissions}` to the call context. When
//! authentication is globally disabled the filter passes every request
//! through untouched.

use crate::keystore::Keystore;
use aif_core::filter::{FilterAction, FilterContext, FilterError, FilterOrder, GatewayFilter};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct ApiKeyFilter {
    keystore: Arc<Keystore>,
    enabled: bool,
}

impl ApiKeyFilter {
    pub fn new(keystore: Arc<Keystore>, enabled: bool) -> Self {
        Self { keystore, enabled }
    }
}

fn extract_key(ctx: &FilterContext) -> Option<String> {
    if let Some(key) = ctx.headers.get("x-api-key") {
        return Some(key.clone());
    }
    ctx.headers.get("authorization")?.strip_prefix("Bearer ").map(str::to_string)
}

#[async_trait]
impl GatewayFilter for ApiKeyFilter {
    fn name(&self) -> &str {
        "api_key_auth"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::AUTH
    }

    async fn on_request(&self, ctx: &mut FilterContext) -> Result<FilterAction, FilterError> {
        if !self.enabled {
            return Ok(FilterAction::Continue);
        }

        let Some(key) = extract_key(ctx) else {
            return Ok(FilterAction::Reject(401, "missing or invalid authentication credentials".to_string()));
        };

        let Some(found) = self.keystore.authenticate(&key) else {
            return Ok(FilterAction::Reject(401, "missing or invalid authentication credentials".to_string()));
        };

        ctx.principal = Some(found.name.clone());
        ctx.attributes.insert("permissions".to_string(), json!(found.permissions.iter().collect::<Vec<_>>()));
        Ok(FilterAction::Continue)
    }
}
