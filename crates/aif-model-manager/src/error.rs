//! HTTP mapping for model manager errors.

use aif_core::error::InferenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Thin `IntoResponse` wrapper around the shared error taxonomy.
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
