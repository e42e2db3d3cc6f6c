//! The gateway's filter chain: an ordered list of [`GatewayFilter`]s run
//! against every inbound request before it is forwarded anywhere.

pub mod auth;
pub mod rate_limit;

pub use auth::ApiKeyFilter;
pub use rate_limit::RateLimitFilter;

use aif_core::filter::{FilterAction, FilterContext, FilterError, GatewayFilter};
use std::sync::Arc;

/// Runs its filters in ascending [`aif_core::filter::FilterOrder`],
/// short-circuiting on the first non-`Continue` action.
pub struct FilterChain {
    filters: Vec<Arc<dyn GatewayFilter>>,
}

impl FilterChain {
    pub fn new(mut filters: Vec<Arc<dyn GatewayFilter>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    pub async fn run(&self, ctx: &mut FilterContext) -> Result<FilterAction, FilterError> {
        for filter in &self.filters {
            match filter.on_request(ctx).await? {
                FilterAction::Continue => continue,
                other => return Ok(other),
            }
        }
        Ok(FilterAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::{ApiKey, Keystore};

    #[tokio::test]
    async fn auth_runs_before_rate_limit_so_a_rejected_key_never_consumes_a_slot() {
        let keystore = Arc::new(Keystore::new());
        let chain = FilterChain::new(vec![
            Arc::new(ApiKeyFilter::new(keystore.clone(), true)),
            Arc::new(RateLimitFilter::new(60_000, 1, true)),
        ]);

        let mut ctx = FilterContext::new("r1", "/api/v1/inference/m1", "9.9.9.9");
        let action = chain.run(&mut ctx).await.unwrap();
        assert_eq!(action, FilterAction::Reject(401, "missing or invalid authentication credentials".to_string()));

        keystore.issue(ApiKey::new("k1", "demo", vec!["*".to_string()]));
        let mut ctx = FilterContext::new("r2", "/api/v1/inference/m1", "9.9.9.9").with_header("x-api-key", "k1");
        let action = chain.run(&mut ctx).await.unwrap();
        assert_eq!(action, FilterAction::Continue, "first authenticated request from this IP still has budget");
    }
}
