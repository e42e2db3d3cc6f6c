use aif_model_manager::{ModelManagerConfig, ModelManagerServer};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> axum::Router {
    let dir = tempfile::tempdir().unwrap();
    let config = ModelManagerConfig {
        port: 0,
        storage_dir: dir.path().to_string_lossy().to_string(),
        max_model_size: "1MB".to_string(),
    };
    std::mem::forget(dir);
    ModelManagerServer::new(config).build_app().await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_list_then_fetch_round_trips() {
    let app = test_app().await;
    let payload = base64::engine::general_purpose::STANDARD.encode(b"weights-go-here");
    let body = json!({
        "modelId": "resnet50",
        "modelData": payload,
        "metadata": { "type": "classifier", "version": "2.0.0", "description": "image classifier" }
    });

    let create_resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/models")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_resp.status(), StatusCode::OK);
    let created = body_json(create_resp).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["modelId"], "resnet50");

    let list_resp = app
        .clone()
        .oneshot(Request::builder().uri("/api/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let listed = body_json(list_resp).await;
    assert_eq!(listed["count"], 1);

    let get_resp = app
        .oneshot(
            Request::builder()
                .uri("/api/models/resnet50")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_resp.status(), StatusCode::OK);
    let fetched = body_json(get_resp).await;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(fetched["modelData"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, b"weights-go-here");
}

#[tokio::test]
async fn creating_duplicate_model_id_conflicts() {
    let app = test_app().await;
    let payload = base64::engine::general_purpose::STANDARD.encode(b"v1");
    let body = json!({ "modelId": "dup", "modelData": payload, "metadata": {} });

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/models")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/models")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn fetching_unknown_model_returns_404() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/models/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
