//! Caller-observable error taxonomy shared by every service in the fleet.
//!
//! Every failure a client can see — whether it originates at the gateway,
//! the orchestrator, a worker, or the model manager — is a variant of
//! [`InferenceError`]. Each service crate wraps this enum in its own HTTP
//! (or RPC) mapping; the kind and the wording are decided once, here.

use thiserror::Error;

/// A caller-observable failure kind.
///
/// `#[non_exhaustive]` so new kinds can be added without breaking
/// downstream `match` arms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InferenceError {
    // ── Gateway: auth & throttling ──────────────────────────────────────
    #[error("missing or invalid authentication credentials")]
    Unauthenticated,

    #[error("principal lacks permission '{0}'")]
    Forbidden(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("bad request: {0}")]
    BadRequest(String),

    // ── Model manager ────────────────────────────────────────────────────
    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("model '{0}' already exists")]
    ModelAlreadyExists(String),

    #[error("model data exceeds the configured size cap ({0} bytes)")]
    ModelTooLarge(usize),

    #[error("invalid model data: {0}")]
    InvalidModelData(String),

    #[error("invalid model metadata: {0}")]
    InvalidMetadata(String),

    #[error("checksum mismatch for storage key '{0}'")]
    IntegrityMismatch(String),

    // ── Orchestrator: selection & routing ────────────────────────────────
    #[error("no workers are registered for model '{0}'")]
    NoWorkersAvailable(String),

    #[error("no workers satisfy the requested requirements")]
    NoWorkersMatchRequirements,

    // ── Worker: capacity & execution ─────────────────────────────────────
    #[error("worker is at capacity")]
    CapacityExceeded,

    #[error("model '{0}' is not preloaded on this worker")]
    ModelNotAvailable(String),

    #[error("inference timed out after {0}ms")]
    InferenceTimeout(u64),

    #[error("execution failed: {0}")]
    ExecutionError(String),

    // ── Cross-service transport ───────────────────────────────────────────
    #[error("transport error talking to worker '{0}': {1}")]
    TransportError(String, String),

    #[error("no worker could be reached")]
    Unavailable,
}

impl InferenceError {
    /// The HTTP status code a gateway-facing handler should return for this
    /// error kind. Kept here so every service maps the same kind to the
    /// same code (see spec §6/§7).
    pub fn status_code(&self) -> u16 {
        match self {
            InferenceError::Unauthenticated => 401,
            InferenceError::Forbidden(_) => 403,
            InferenceError::RateLimited => 429,
            InferenceError::BadRequest(_) => 400,
            InferenceError::ModelNotFound(_) => 404,
            InferenceError::ModelAlreadyExists(_) => 409,
            InferenceError::ModelTooLarge(_) => 413,
            InferenceError::InvalidModelData(_) => 400,
            InferenceError::InvalidMetadata(_) => 400,
            InferenceError::IntegrityMismatch(_) => 500,
            InferenceError::NoWorkersAvailable(_) => 503,
            InferenceError::NoWorkersMatchRequirements => 503,
            InferenceError::CapacityExceeded => 500,
            InferenceError::ModelNotAvailable(_) => 500,
            InferenceError::InferenceTimeout(_) => 504,
            InferenceError::ExecutionError(_) => 500,
            InferenceError::TransportError(_, _) => 502,
            InferenceError::Unavailable => 503,
        }
    }

    /// Stable machine-readable code for structured error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            InferenceError::Unauthenticated => "UNAUTHENTICATED",
            InferenceError::Forbidden(_) => "FORBIDDEN",
            InferenceError::RateLimited => "RATE_LIMITED",
            InferenceError::BadRequest(_) => "BAD_REQUEST",
            InferenceError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            InferenceError::ModelAlreadyExists(_) => "MODEL_ALREADY_EXISTS",
            InferenceError::ModelTooLarge(_) => "MODEL_TOO_LARGE",
            InferenceError::InvalidModelData(_) => "INVALID_MODEL_DATA",
            InferenceError::InvalidMetadata(_) => "INVALID_METADATA",
            InferenceError::IntegrityMismatch(_) => "INTEGRITY_MISMATCH",
            InferenceError::NoWorkersAvailable(_) => "NO_WORKERS_AVAILABLE",
            InferenceError::NoWorkersMatchRequirements => "NO_WORKERS_MATCH_REQUIREMENTS",
            InferenceError::CapacityExceeded => "CAPACITY_EXCEEDED",
            InferenceError::ModelNotAvailable(_) => "MODEL_NOT_AVAILABLE",
            InferenceError::InferenceTimeout(_) => "INFERENCE_TIMEOUT",
            InferenceError::ExecutionError(_) => "EXECUTION_ERROR",
            InferenceError::TransportError(_, _) => "TRANSPORT_ERROR",
            InferenceError::Unavailable => "UNAVAILABLE",
        }
    }
}

/// Convenience alias used throughout the fleet's crates.
pub type InferenceResult<T> = Result<T, InferenceError>;
