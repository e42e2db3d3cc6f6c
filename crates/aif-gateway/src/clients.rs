//! Upstream HTTP clients: thin `reqwest` wrappers over the orchestrator's
//! and model manager's surfaces (spec §6). The gateway never implements
//! routing or storage logic itself — it authenticates, rate-limits, and
//! forwards.

use aif_core::error::InferenceError;
use serde_json::Value;
use std::time::Duration;

/// Talks to the orchestrator's control-plane HTTP surface.
pub struct OrchestratorClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client builds");
        Self { http, base_url: base_url.into() }
    }

    pub async fn route_inference(&self, body: Value) -> Result<Value, InferenceError> {
        let url = format!("{}/api/inference/route", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(InferenceError::Unavailable);
        }
        if !resp.status().is_success() {
            return Err(InferenceError::Unavailable);
        }
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }

    pub async fn status(&self) -> Result<Value, InferenceError> {
        let url = format!("{}/api/status", self.base_url);
        let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&e))?;
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }

    pub async fn health(&self) -> Result<Value, InferenceError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&e))?;
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }
}

/// Talks to the model manager's storage/catalog surface.
pub struct ModelManagerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ModelManagerClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client builds");
        Self { http, base_url: base_url.into() }
    }

    pub async fn list_models(&self, model_type: Option<&str>, limit: Option<usize>) -> Result<Value, InferenceError> {
        let mut url = format!("{}/api/models", self.base_url);
        let mut params = Vec::new();
        if let Some(t) = model_type {
            params.push(format!("type={t}"));
        }
        if let Some(l) = limit {
            params.push(format!("limit={l}"));
        }
        if !params.is_empty() {
            url = format!("{url}?{}", params.join("&"));
        }
        let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&e))?;
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }

    pub async fn get_model(&self, model_id: &str) -> Result<Value, InferenceError> {
        let url = format!("{}/api/models/{model_id}", self.base_url);
        let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&e))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(InferenceError::ModelNotFound(model_id.to_string()));
        }
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }

    pub async fn create_model(&self, body: Value) -> Result<Value, InferenceError> {
        let url = format!("{}/api/models", self.base_url);
        let resp = self.http.post(&url).json(&body).send().await.map_err(|e| transport_error(&e))?;
        if resp.status() == reqwest::StatusCode::CONFLICT {
            let model_id = body.get("modelId").and_then(Value::as_str).unwrap_or_default();
            return Err(InferenceError::ModelAlreadyExists(model_id.to_string()));
        }
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }

    pub async fn health(&self) -> Result<Value, InferenceError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&e))?;
        resp.json::<Value>().await.map_err(|e| transport_error(&e))
    }
}

fn transport_error(err: &reqwest::Error) -> InferenceError {
    InferenceError::TransportError("upstream".to_string(), err.to_string())
}
