//! `ModelFetcher` implementation that pulls model bytes from the Model
//! Manager's HTTP surface (`GET /api/models/:modelId`).

use crate::model_cache::ModelFetcher;
use base64::Engine;
use std::time::Duration;

pub struct HttpModelFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpModelFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ModelFetcher for HttpModelFetcher {
    async fn fetch(&self, model_id: &str) -> Result<(Vec<u8>, String), String> {
        let url = format!("{}/api/models/{}", self.base_url.trim_end_matches('/'), model_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("model manager unreachable: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("model manager returned {}", resp.status()));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| format!("malformed model manager response: {e}"))?;

        let encoded = body
            .get("modelData")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "response missing modelData".to_string())?;
        let checksum = body
            .get("metadata")
            .and_then(|m| m.get("checksum"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| format!("invalid base64 model data: {e}"))?;

        Ok((bytes, checksum))
    }
}
