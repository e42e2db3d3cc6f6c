use aif_gateway::{GatewayConfig, GatewayServer};
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower::ServiceExt;

async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn mock_orchestrator() -> String {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/api/status", get(|| async { Json(json!({ "totalCount": 1, "healthyCount": 1 })) }))
        .route(
            "/api/inference/route",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "success": true,
                    "result": { "predictions": [1,2,3], "confidence": 0.9, "processingTime": 12 },
                    "workerId": "w1",
                    "routedAt": 0,
                    "echo": body["modelId"],
                }))
            }),
        );
    spawn_mock(app).await
}

async fn mock_model_manager() -> String {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route(
            "/api/models",
            get(|| async { Json(json!({ "success": true, "models": [], "count": 0 })) })
                .post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "success": true,
                        "modelId": body["modelId"],
                        "result": { "status": "stored", "size": 3, "checksum": "abc", "createdAt": 0 }
                    }))
                }),
        )
        .route(
            "/api/models/{model_id}",
            get(|| async {
                Json(json!({
                    "modelId": "m1",
                    "metadata": { "type": "classifier", "version": "1.0.0", "description": "demo" },
                    "modelData": "AAA=",
                }))
            }),
        );
    spawn_mock(app).await
}

async fn test_app(auth_enabled: bool, max_requests: u64) -> axum::Router {
    let orchestrator_url = mock_orchestrator().await;
    let model_manager_url = mock_model_manager().await;
    let mut config = GatewayConfig {
        port: 0,
        orchestrator_url,
        model_manager_url,
        api_keys: vec![aif_gateway::config::ApiKeySeed {
            key: "demo-api-key-123".to_string(),
            name: "demo".to_string(),
            permissions: vec!["*".to_string()],
        }],
        ..GatewayConfig::default()
    };
    config.authentication.enabled = auth_enabled;
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_ms = 60_000;
    GatewayServer::new(config).build_app().0
}

fn peer() -> SocketAddr {
    "9.9.9.9:1234".parse().unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .extension(ConnectInfo(peer()))
        .body(Body::empty())
        .unwrap()
}

fn get_req_with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", key)
        .extension(ConnectInfo(peer()))
        .body(Body::empty())
        .unwrap()
}

fn post_req_with_key(uri: &str, key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", key)
        .extension(ConnectInfo(peer()))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok_without_auth() {
    let app = test_app(true, 100).await;
    let response = app.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn inference_without_api_key_is_unauthenticated() {
    let app = test_app(true, 100).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/inference/m1")
                .header("content-type", "application/json")
                .extension(ConnectInfo(peer()))
                .body(Body::from(serde_json::to_vec(&json!({ "inputData": { "x": 1 } })).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inference_with_wrong_key_is_unauthenticated() {
    let app = test_app(true, 100).await;
    let response = app
        .oneshot(post_req_with_key("/api/v1/inference/m1", "wrong", json!({ "inputData": { "x": 1 } })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inference_with_valid_key_routes_through_to_the_orchestrator() {
    let app = test_app(true, 100).await;
    let response = app
        .oneshot(post_req_with_key(
            "/api/v1/inference/m1",
            "demo-api-key-123",
            json!({ "inputData": { "x": 1 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["modelId"], "m1");
    assert_eq!(body["workerId"], "w1");
    assert_eq!(body["result"]["predictions"], json!([1, 2, 3]));
}

#[tokio::test]
async fn inference_missing_input_data_is_bad_request() {
    let app = test_app(true, 100).await;
    let response = app
        .oneshot(post_req_with_key("/api/v1/inference/m1", "demo-api-key-123", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn third_request_within_window_is_rate_limited() {
    let app = test_app(false, 2).await;
    let first = app.clone().oneshot(get_req("/api/v1/models")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(get_req("/api/v1/models")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let third = app.oneshot(get_req("/api/v1/models")).await.unwrap();
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn list_models_forwards_to_model_manager() {
    let app = test_app(false, 100).await;
    let response = app.oneshot(get_req("/api/v1/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn get_model_forwards_metadata() {
    let app = test_app(false, 100).await;
    let response = app.oneshot(get_req("/api/v1/models/m1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["model"]["modelId"], "m1");
    assert_eq!(body["model"]["type"], "classifier");
}

#[tokio::test]
async fn status_aggregates_upstream_health() {
    let app = test_app(false, 100).await;
    let response = app.oneshot(get_req("/api/v1/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["orchestrator"]["totalCount"], 1);
}
