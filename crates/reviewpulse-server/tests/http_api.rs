//! HTTP API tests driven through the router with `oneshot`

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use reviewpulse_classifiers::fixtures;
use reviewpulse_server::config::{ArtifactConfig, ServerConfig};
use reviewpulse_server::{create_router, AppState};
use serde_json::{json, Value};
use std::path::Path;
use tower::ServiceExt;

fn config_for(dir: &Path) -> ServerConfig {
    ServerConfig {
        artifacts: ArtifactConfig {
            base_dir: dir.to_path_buf(),
            classifier: fixtures::CLASSIFIER_FILE.to_string(),
            vectorizer: fixtures::VECTORIZER_FILE.to_string(),
        },
        ..Default::default()
    }
}

/// Router over a directory that already holds the fixture artifacts
fn ready_app() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_sentiment_artifacts(dir.path()).unwrap();
    let state = AppState::new(config_for(dir.path()), None);
    (dir, state)
}

/// Router over an empty directory
fn degraded_app() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(config_for(dir.path()), None);
    (dir, state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Empty bodies come back as Null
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn predict(state: &AppState, body: Value) -> (StatusCode, Value) {
    send(
        create_router(state.clone()),
        post_json("/predict", body.to_string()),
    )
    .await
}

#[tokio::test]
async fn test_predict_positive_review() {
    let (_dir, state) = ready_app();
    let (status, body) = predict(&state, json!({ "review": "Great Movie!!" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["processed_text"], "great movie");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence > 0.5 && confidence <= 1.0);
}

#[tokio::test]
async fn test_predict_negative_review() {
    let (_dir, state) = ready_app();
    let (status, body) = predict(&state, json!({ "review": "Terrible and boring." })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "negative");
    assert_eq!(body["processed_text"], "terrible and boring");
}

#[tokio::test]
async fn test_predict_non_string_review_is_coerced() {
    let (_dir, state) = ready_app();
    let (status, body) = predict(&state, json!({ "review": 12345 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_text"], "no_text");
    assert_eq!(body["confidence"].as_f64().unwrap(), 0.5);

    let (status, body) = predict(&state, json!({ "review": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_text"], "none");

    let (status, body) = predict(&state, json!({ "review": ["Great", "movie"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_text"], "great movie");
    assert_eq!(body["sentiment"], "positive");
}

#[tokio::test]
async fn test_predict_missing_review() {
    let (_dir, state) = ready_app();
    let (status, body) = predict(&state, json!({ "text": "Great movie" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No review provided");
    assert_eq!(body["usage"]["example"]["review"], "Your review text here");
}

#[tokio::test]
async fn test_predict_invalid_json() {
    let (_dir, state) = ready_app();
    let (status, body) = send(
        create_router(state),
        post_json("/predict", "{\"review\": "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No review provided");
}

#[tokio::test]
async fn test_predict_when_degraded() {
    let (_dir, state) = degraded_app();

    // readiness wins over a malformed body
    let (status, body) = send(create_router(state.clone()), post_json("/predict", "nope")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Models not loaded");
    assert_eq!(body["details"], "Service initialization incomplete");

    let (status, _) = predict(&state, json!({ "review": "Great movie" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_reports_environment() {
    let (_dir, state) = ready_app();
    let (status, body) = send(create_router(state), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"], true);

    let env = &body["environment"];
    assert_eq!(env["files_exist"]["model"], true);
    assert_eq!(env["files_exist"]["vectorizer"], true);
    assert!(env["file_sizes"]["model"].as_u64().unwrap() > 0);
    assert_eq!(env["generation"], 1);
    assert_eq!(env["loaded_artifacts"]["classifier"], "logistic_regression");
    assert_eq!(env["last_load"]["success"], true);
    assert!(env["service_version"].is_string());

    let runtime = &env["runtime"];
    assert!(!runtime["rustc_version"].as_str().unwrap().is_empty());
    assert_eq!(runtime["target_os"], std::env::consts::OS);
    assert_eq!(runtime["artifact_format"], "reviewpulse-artifact");
    assert_eq!(runtime["artifact_version"], 1);
}

#[tokio::test]
async fn test_health_when_degraded() {
    let (_dir, state) = degraded_app();
    let (status, body) = send(create_router(state), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["models_loaded"], false);
    assert_eq!(body["environment"]["files_exist"]["model"], false);
    assert_eq!(body["environment"]["file_sizes"]["vectorizer"], 0);
    assert_eq!(body["environment"]["last_load"]["success"], false);
}

#[tokio::test]
async fn test_reload_recovers_degraded_service() {
    let (dir, state) = degraded_app();

    fixtures::write_sentiment_artifacts(dir.path()).unwrap();
    let (status, body) = send(create_router(state.clone()), post_json("/reload", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Models reloaded successfully");

    let (status, body) = predict(&state, json!({ "review": "I love it" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "positive");
}

#[tokio::test]
async fn test_failed_reload_keeps_serving() {
    let (dir, state) = ready_app();
    std::fs::remove_file(dir.path().join(fixtures::VECTORIZER_FILE)).unwrap();

    let (status, body) = send(create_router(state.clone()), post_json("/reload", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to reload models"));

    let (_, health) = send(create_router(state.clone()), get("/health")).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["environment"]["last_load"]["success"], false);

    let (status, _) = predict(&state, json!({ "review": "excellent" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (_dir, mut state) = ready_app();
    let mut config = (*state.config).clone();
    config.server.max_body_bytes = 32;
    state.config = std::sync::Arc::new(config);

    let review = "great ".repeat(20);
    let payload = json!({ "review": review }).to_string();

    let (status, body) = send(
        create_router(state.clone()),
        post_json("/predict", payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request body too large");

    // clients that announce the length get the same JSON error
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(create_router(state), request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request body too large");
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let (_dir, state) = ready_app();
    let response = create_router(state).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (_dir, state) = ready_app();
    let (status, body) = send(create_router(state), get("/v1/models")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_wrong_method() {
    let (_dir, state) = ready_app();
    let response = create_router(state).oneshot(get("/predict")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
