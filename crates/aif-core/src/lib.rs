//! Shared contracts for the AI Inference Fleet control and data plane.
//!
//! This crate carries no service-specific logic. It defines the vocabulary
//! every other crate in the workspace speaks:
//!
//! - [`error`] — the caller-observable error taxonomy ([`error::InferenceError`]).
//! - [`contracts`] — wire-level DTOs shared between the gateway, orchestrator,
//!   worker, and model manager (worker descriptors, inference envelopes,
//!   model metadata).
//! - [`registry`] — the [`registry::ServiceRegistry`] trait implemented by the
//!   orchestrator's in-memory worker registry.
//! - [`transport`] — the [`transport::RpcClient`] trait that decouples
//!   orchestrator routing logic from the concrete wire protocol used to
//!   reach a worker, so routing can be tested without a network.
//! - [`filter`] — the [`filter::GatewayFilter`] chain contract used by the
//!   gateway's auth and rate-limit stages.
//! - [`config`] — multi-format configuration loading (TOML/YAML/JSON/...)
//!   with environment-variable substitution.

pub mod config;
pub mod contracts;
pub mod error;
pub mod filter;
pub mod registry;
pub mod transport;

pub use error::{InferenceError, InferenceResult};
