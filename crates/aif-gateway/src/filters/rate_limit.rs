//! Sliding-window-count rate limiter (spec §4.5), keyed by client IP.
//!
//! State per client is `{requests, windowStart}`. On a request: if
//! `now − windowStart > windowMs`, the window resets (`requests ← 1`,
//! `windowStart ← now`, allow); else if `requests ≥ maxRequests`, deny;
//! else increment and allow. This is monotone within a window — once a
//! client is denied, it stays denied until the window rolls over.

use aif_core::filter::{FilterAction, FilterContext, FilterError, FilterOrder, GatewayFilter};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

struct ClientWindow {
    requests: u64,
    window_start: u64,
}

pub struct RateLimiter {
    clients: DashMap<String, ClientWindow>,
    window_ms: u64,
    max_requests: u64,
}

impl RateLimiter {
    pub fn new(window_ms: u64, max_requests: u64) -> Self {
        Self { clients: DashMap::new(), window_ms, max_requests }
    }

    /// Returns `true` if the request from `client_key` is admitted.
    pub fn check(&self, client_key: &str, now_ms: u64) -> bool {
        let mut entry = self.clients.entry(client_key.to_string()).or_insert_with(|| ClientWindow {
            requests: 0,
            window_start: now_ms,
        });

        if now_ms.saturating_sub(entry.window_start) > self.window_ms {
            entry.requests = 1;
            entry.window_start = now_ms;
            return true;
        }

        if entry.requests >= self.max_requests {
            return false;
        }

        entry.requests += 1;
        true
    }

    /// Prunes entries idle for more than `2 * windowMs`. Run from a
    /// background tick, not the request path.
    pub fn gc(&self, now_ms: u64) {
        let stale_after = self.window_ms.saturating_mul(2);
        self.clients.retain(|_, w| now_ms.saturating_sub(w.window_start) <= stale_after);
    }
}

/// Wraps a [`RateLimiter`] as a chain-order filter. Runs after auth so a
/// rejected key never consumes a slot in the window.
pub struct RateLimitFilter {
    limiter: RateLimiter,
    enabled: bool,
}

impl RateLimitFilter {
    pub fn new(window_ms: u64, max_requests: u64, enabled: bool) -> Self {
        Self { limiter: RateLimiter::new(window_ms, max_requests), enabled }
    }

    pub fn gc_tick(&self) {
        self.limiter.gc(now_ms());
    }
}

#[async_trait]
impl GatewayFilter for RateLimitFilter {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::RATE_LIMIT
    }

    async fn on_request(&self, ctx: &mut FilterContext) -> Result<FilterAction, FilterError> {
        if !self.enabled {
            return Ok(FilterAction::Continue);
        }
        if self.limiter.check(&ctx.client_ip, now_ms()) {
            Ok(FilterAction::Continue)
        } else {
            Ok(FilterAction::Reject(429, "rate limit exceeded".to_string()))
        }
    }
}
