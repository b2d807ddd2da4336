//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reviewpulse_classifiers::artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION};
use reviewpulse_core::{coerce_text, Error};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::state::{loaded_gauge, AppState};

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;
    Router::new()
        .route("/predict", post(predict))
        .route("/reload", post(reload))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    sentiment: String,
    confidence: f64,
    processed_text: String,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    success: bool,
    message: String,
}

/// Classify one review.
///
/// Readiness is checked before the body is looked at.
async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    metrics::counter!("reviewpulse_requests_total", "endpoint" => "predict").increment(1);

    if !state.service.state().is_ready() {
        return Err(AppError::NotReady);
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::MissingReview
        }
    })?;
    let review = extract_review(&body)?;
    let raw = coerce_text(&review);

    let start = Instant::now();
    let result = state.service.predict(&raw).map_err(|e| {
        if !matches!(e, Error::NotReady) {
            error!(kind = e.kind(), error = %e, "prediction failed");
        }
        AppError::from(e)
    })?;
    metrics::histogram!("reviewpulse_inference_latency_us")
        .record(start.elapsed().as_micros() as f64);
    metrics::counter!("reviewpulse_predictions_total", "sentiment" => result.label.clone())
        .increment(1);

    Ok(Json(PredictResponse {
        sentiment: result.label,
        confidence: result.confidence,
        processed_text: result.normalized_text,
    })
    .into_response())
}

/// Pull the `review` value out of a JSON object body
fn extract_review(body: &[u8]) -> Result<Value, AppError> {
    let doc: Value = serde_json::from_slice(body).map_err(|_| AppError::MissingReview)?;
    doc.get("review").cloned().ok_or(AppError::MissingReview)
}

async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    metrics::counter!("reviewpulse_requests_total", "endpoint" => "reload").increment(1);

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.reload())
        .await
        .map_err(|e| AppError::Internal(format!("reload task failed: {e}")))?;

    let label = if outcome.success { "success" } else { "failure" };
    metrics::counter!("reviewpulse_reloads_total", "outcome" => label).increment(1);
    metrics::gauge!("reviewpulse_models_loaded").set(loaded_gauge(&state.service));

    if outcome.success {
        info!(state = ?outcome.state, "models reloaded");
    } else {
        warn!(state = ?outcome.state, message = %outcome.message, "model reload failed");
    }

    Ok(Json(ReloadResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}

/// Liveness plus artifact diagnostics. Always 200.
async fn health(State(state): State<AppState>) -> Json<Value> {
    metrics::counter!("reviewpulse_requests_total", "endpoint" => "health").increment(1);

    let report = state.service.health();
    let store = &report.store;
    let working_directory = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    Json(json!({
        "status": report.state.health_label(),
        "models_loaded": report.models_loaded,
        "environment": {
            "service_version": env!("CARGO_PKG_VERSION"),
            "components": {
                "reviewpulse-core": reviewpulse_core::VERSION,
                "reviewpulse-classifiers": reviewpulse_classifiers::VERSION,
            },
            "runtime": {
                "rustc_version": env!("REVIEWPULSE_RUSTC_VERSION"),
                "target_os": std::env::consts::OS,
                "target_arch": std::env::consts::ARCH,
                "artifact_format": ARTIFACT_FORMAT,
                "artifact_version": ARTIFACT_VERSION,
            },
            "state": report.state,
            "working_directory": working_directory,
            "base_directory": state.config.artifacts.base_dir.display().to_string(),
            "files_exist": {
                "model": store.classifier.exists,
                "vectorizer": store.vectorizer.exists,
            },
            "file_sizes": {
                "model": store.classifier.size_bytes,
                "vectorizer": store.vectorizer.size_bytes,
            },
            "supported_artifacts": {
                "vectorizers": report.supported_vectorizers,
                "classifiers": report.supported_classifiers,
            },
            "loaded_artifacts": {
                "vectorizer": store.vectorizer_type,
                "classifier": store.classifier_type,
            },
            "generation": store.generation,
            "loaded_at": store.loaded_at,
            "last_load": store.last_attempt,
        }
    }))
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotReady,
    MissingReview,
    PayloadTooLarge,
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotReady => AppError::NotReady,
            Error::Validation(_) => AppError::MissingReview,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::NotReady => "not_ready",
            AppError::MissingReview => "validation",
            AppError::PayloadTooLarge => "payload_too_large",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("reviewpulse_errors_total", "kind" => self.kind()).increment(1);

        let (status, body) = match self {
            AppError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "Models not loaded",
                    "details": "Service initialization incomplete",
                }),
            ),
            AppError::MissingReview => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "No review provided",
                    "usage": {
                        "example": { "review": "Your review text here" }
                    },
                }),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Request body too large" }),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
