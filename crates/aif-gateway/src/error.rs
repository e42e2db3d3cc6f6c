//! HTTP mapping for gateway-originated errors (auth, rate limiting, bad
//! requests raised before a call ever leaves this process).
//!
//! Errors that originate downstream (orchestrator, model manager) are
//! forwarded with their own status/body by the upstream clients rather
//! than re-wrapped here — see [`crate::clients`].

use aif_core::error::InferenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ApiError(pub InferenceError);

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
