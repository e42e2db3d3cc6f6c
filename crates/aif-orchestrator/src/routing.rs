//! `routeInferenceRequest` — the orchestrator's single routing operation
//! (spec §4.4.4): filter candidates, pick one, dispatch, record stats.

use crate::balancer::{CompletionReport, LoadBalancer};
use crate::rpc::RpcClientCache;
use aif_core::contracts::{InferenceRequest, RequirementsFilter};
use aif_core::error::InferenceError;
use aif_core::registry::{ServiceRegistry, WorkerRecord};
use aif_core::transport::RpcError;
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct RoutedResult {
    pub worker_id: String,
    pub response: serde_json::Value,
    pub routed_at: u64,
}

/// `filterByRequirements`: every candidate must carry all requested
/// capability tags, and (when set) must have strictly less current load
/// than `min_capacity`.
fn filter_by_requirements(
    candidates: Vec<WorkerRecord>,
    requirements: Option<&RequirementsFilter>,
    balancer: &LoadBalancer,
) -> Vec<WorkerRecord> {
    let Some(req) = requirements else {
        return candidates;
    };
    candidates
        .into_iter()
        .filter(|w| req.capabilities.iter().all(|tag| w.capabilities.contains(tag)))
        .filter(|w| match req.min_capacity {
            Some(min) => balancer.stats_for(&w.id).current_load < min,
            None => true,
        })
        .collect()
}

/// Route one inference request to a single worker. Does not retry against
/// a second candidate on transport failure — the spec pins this (§7,
/// §9 Open Questions) as bubble-not-failover.
pub async fn route_inference_request(
    registry: &dyn ServiceRegistry,
    balancer: &LoadBalancer,
    rpc_cache: &RpcClientCache,
    request: InferenceRequest,
    request_timeout_ms: u64,
) -> Result<RoutedResult, InferenceError> {
    let candidates = registry.workers_for_model(&request.model_id);
    if candidates.is_empty() {
        return Err(InferenceError::NoWorkersAvailable(request.model_id));
    }

    let candidates = filter_by_requirements(candidates, request.options.requirements.as_ref(), balancer);
    if candidates.is_empty() {
        return Err(InferenceError::NoWorkersMatchRequirements);
    }

    let worker = balancer
        .pick(&candidates, &request.model_id)
        .ok_or(InferenceError::NoWorkersAvailable(request.model_id.clone()))?
        .clone();

    balancer.acquire_in_flight(&worker.id);
    let outcome = dispatch(rpc_cache, balancer, &worker, &request, request_timeout_ms).await;
    balancer.release_in_flight(&worker.id);

    let routed_at = now_ms();
    match outcome {
        Ok(response) => {
            let success = response.get("success").and_then(|v| v.as_bool()).unwrap_or(true);
            let processing_time = response
                .get("processingTime")
                .or_else(|| response.get("processing_time"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            balancer.record_completion(
                &worker.id,
                CompletionReport { processing_time_ms: processing_time, success },
                routed_at,
            );
            Ok(RoutedResult { worker_id: worker.id, response, routed_at })
        }
        Err(err) => {
            balancer.record_completion(
                &worker.id,
                CompletionReport { processing_time_ms: 0, success: false },
                routed_at,
            );
            rpc_cache.evict(&worker.id);
            Err(err)
        }
    }
}

async fn dispatch(
    rpc_cache: &RpcClientCache,
    _balancer: &LoadBalancer,
    worker: &WorkerRecord,
    request: &InferenceRequest,
    request_timeout_ms: u64,
) -> Result<serde_json::Value, InferenceError> {
    let client = rpc_cache.get_or_create(&worker.id, &worker.address);
    let params = json!({
        "modelId": request.model_id,
        "inputData": request.input_data,
        "options": request.options,
    });
    let timeout_ms = request.options.timeout.unwrap_or(request_timeout_ms);

    client.call("runInference", params, timeout_ms).await.map_err(|err| {
        let detail = match err {
            RpcError::Timeout(ms) => format!("timed out after {ms}ms"),
            RpcError::Transport(msg) => msg,
            RpcError::Malformed(msg) => msg,
        };
        tracing::warn!(worker_id = %worker.id, error = %detail, "rpc call to worker failed, surfacing as Unavailable");
        InferenceError::Unavailable
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadBalancingStrategy;
    use crate::registry::{record_from, InMemoryServiceRegistry};
    use aif_core::contracts::InferenceOptions;
    use aif_core::transport::RpcClient;
    use async_trait::async_trait;

    struct StubClient {
        response: Result<serde_json::Value, RpcError>,
    }

    #[async_trait]
    impl RpcClient for StubClient {
        async fn call(&self, _method: &str, _params: serde_json::Value, _timeout_ms: u64) -> Result<serde_json::Value, RpcError> {
            self.response.clone()
        }
    }

    fn request(model_id: &str) -> InferenceRequest {
        InferenceRequest {
            model_id: model_id.to_string(),
            input_data: json!({"x": 1}),
            options: InferenceOptions::default(),
        }
    }

    #[tokio::test]
    async fn no_candidates_surfaces_no_workers_available() {
        let registry = InMemoryServiceRegistry::new();
        let balancer = LoadBalancer::new(LoadBalancingStrategy::RoundRobin);
        let cache = RpcClientCache::new();
        let err = route_inference_request(&registry, &balancer, &cache, request("m1"), 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::NoWorkersAvailable(_)));
    }

    #[tokio::test]
    async fn requirements_filter_excludes_workers_missing_capabilities() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        let balancer = LoadBalancer::new(LoadBalancingStrategy::RoundRobin);
        let cache = RpcClientCache::new();

        let mut req = request("m1");
        req.options.requirements = Some(RequirementsFilter {
            capabilities: vec!["gpu".to_string()],
            min_capacity: None,
        });
        let err = route_inference_request(&registry, &balancer, &cache, req, 1000).await.unwrap_err();
        assert!(matches!(err, InferenceError::NoWorkersMatchRequirements));
    }

    #[tokio::test]
    async fn successful_dispatch_records_stats_and_releases_in_flight() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        let balancer = LoadBalancer::new(LoadBalancingStrategy::RoundRobin);
        let cache = RpcClientCache::new();
        cache.insert(
            "w1",
            Arc::new(StubClient { response: Ok(json!({"success": true, "processingTime": 42})) }),
        );

        let result = route_inference_request(&registry, &balancer, &cache, request("m1"), 1000).await.unwrap();
        assert_eq!(result.worker_id, "w1");
        assert_eq!(balancer.stats_for("w1").current_load, 0, "in-flight slot released after completion");
        assert_eq!(balancer.stats_for("w1").request_count, 1);
    }

    #[tokio::test]
    async fn transport_failure_does_not_retry_a_second_candidate() {
        let registry = InMemoryServiceRegistry::new();
        registry.register(record_from("w1", "http://w1", vec!["m1".to_string()], 10, 0));
        registry.register(record_from("w2", "http://w2", vec!["m1".to_string()], 10, 0));
        let balancer = LoadBalancer::new(LoadBalancingStrategy::RoundRobin);
        let cache = RpcClientCache::new();
        cache.insert("w1", Arc::new(StubClient { response: Err(RpcError::Transport("boom".to_string())) }));
        cache.insert("w2", Arc::new(StubClient { response: Ok(json!({"success": true, "processingTime": 1})) }));

        let err = route_inference_request(&registry, &balancer, &cache, request("m1"), 1000).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable));
        assert_eq!(balancer.stats_for("w2").request_count, 0, "no failover to w2");
    }
}
