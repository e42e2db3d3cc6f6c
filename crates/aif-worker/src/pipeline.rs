//! The per-request inference pipeline: validate, preprocess, execute under
//! a timeout race, postprocess.

use aif_core::contracts::InferenceOutcome;
use aif_core::error::InferenceError;
use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A loaded model's prediction function. Workers in this fleet run a
/// synthetic predictor (no real model runtime is in scope — see spec
/// non-goals); `Predictor` is the seam a future real backend would occupy.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, processed: Value) -> Result<Value, String>;
}

/// Deterministic-shape synthetic predictor: emits a 1000-element prediction
/// vector and a confidence score, matching the fleet's demo scenario.
pub struct SyntheticPredictor;

#[async_trait]
impl Predictor for SyntheticPredictor {
    async fn predict(&self, _processed: Value) -> Result<Value, String> {
        let mut rng = rand::thread_rng();
        let predictions: Vec<f64> = (0..1000).map(|_| rng.gen_range(0.0..1.0)).collect();
        let confidence: f64 = rng.gen_range(0.0..1.0);
        Ok(json!({ "predictions": predictions, "confidence": confidence }))
    }
}

fn validate_input(input: &Value) -> Result<(), InferenceError> {
    match input {
        Value::Null => Err(InferenceError::BadRequest("inputData must not be null".to_string())),
        Value::Object(map) if map.is_empty() => {
            Err(InferenceError::BadRequest("inputData must not be empty".to_string()))
        }
        Value::Array(items) if items.is_empty() => {
            Err(InferenceError::BadRequest("inputData must not be empty".to_string()))
        }
        _ => Ok(()),
    }
}

fn preprocess(input: Value) -> Value {
    let original_shape = shape_of(&input);
    json!({
        "data": input,
        "metadata": {
            "originalShape": original_shape,
            "processedAt": now_ms(),
        }
    })
}

fn shape_of(value: &Value) -> Value {
    match value {
        Value::Array(items) => json!([items.len()]),
        Value::Object(map) => json!([map.len()]),
        _ => Value::Null,
    }
}

fn postprocess(raw: Value, model_version: &str) -> InferenceOutcome {
    let predictions = raw.get("predictions").cloned().unwrap_or_else(|| raw.clone());
    let confidence = raw.get("confidence").and_then(Value::as_f64).unwrap_or(0.5);
    let _metadata = json!({
        "modelVersion": model_version,
        "processedAt": now_ms(),
    });
    InferenceOutcome {
        predictions,
        confidence,
        processing_time: 0,
    }
}

/// Run the full pipeline for one request, racing `predictor.predict` against
/// `timeout_ms`. A timed-out prediction is abandoned (its task keeps running
/// to completion in the background, but its result is discarded) rather than
/// cancelled, matching the spec's "cannot cancel predict" constraint.
pub async fn run_inference(
    predictor: &(dyn Predictor + Send + Sync),
    input: Value,
    timeout_ms: Option<u64>,
    model_version: &str,
) -> Result<InferenceOutcome, InferenceError> {
    validate_input(&input)?;
    let processed = preprocess(input);
    let timeout = Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, predictor.predict(processed))
        .await
        .map_err(|_| InferenceError::InferenceTimeout(timeout.as_millis() as u64))?
        .map_err(InferenceError::ExecutionError)?;

    let mut result = postprocess(outcome, model_version);
    result.processing_time = started.elapsed().as_millis() as u64;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowPredictor {
        delay: Duration,
    }

    #[async_trait]
    impl Predictor for SlowPredictor {
        async fn predict(&self, _processed: Value) -> Result<Value, String> {
            tokio::time::sleep(self.delay).await;
            Ok(json!({ "predictions": [1.0], "confidence": 0.9 }))
        }
    }

    struct FailingPredictor;

    #[async_trait]
    impl Predictor for FailingPredictor {
        async fn predict(&self, _processed: Value) -> Result<Value, String> {
            Err("model crashed".to_string())
        }
    }

    #[test]
    fn rejects_null_and_empty_input() {
        assert!(validate_input(&Value::Null).is_err());
        assert!(validate_input(&json!({})).is_err());
        assert!(validate_input(&json!([])).is_err());
        assert!(validate_input(&json!({"x": 1})).is_ok());
    }

    #[tokio::test]
    async fn happy_path_returns_predictions_and_confidence() {
        let outcome = run_inference(&SyntheticPredictor, json!({"x": 1}), None, "1.0.0")
            .await
            .unwrap();
        assert_eq!(outcome.predictions.as_array().unwrap().len(), 1000);
        assert!(outcome.confidence >= 0.0 && outcome.confidence <= 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn execute_times_out_when_predict_outlasts_the_deadline() {
        let predictor = SlowPredictor { delay: Duration::from_millis(500) };
        let handle = tokio::spawn(async move {
            run_inference(&predictor, json!({"x": 1}), Some(50), "1.0.0").await
        });
        tokio::time::advance(Duration::from_millis(60)).await;
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(InferenceError::InferenceTimeout(_))));
    }

    #[tokio::test]
    async fn execution_error_propagates_from_predictor() {
        let result = run_inference(&FailingPredictor, json!({"x": 1}), None, "1.0.0").await;
        assert!(matches!(result, Err(InferenceError::ExecutionError(_))));
    }
}
