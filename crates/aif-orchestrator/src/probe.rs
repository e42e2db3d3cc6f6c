//! HTTP implementation of [`crate::health::HealthProbe`]: `GET /health`
//! against the worker's advertised address, success iff 2xx.

use crate::health::HealthProbe;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpHealthProbe {
    client: reqwest::Client,
}

impl Default for HttpHealthProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpHealthProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, _worker_id: &str, address: &str) -> bool {
        let url = format!("{}/health", address.trim_end_matches('/'));
        matches!(self.client.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }
}
