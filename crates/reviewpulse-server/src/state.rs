//! Shared application state

use crate::config::ServerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use reviewpulse_classifiers::{ArtifactStore, SentimentService};
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Serving façade over the artifact store
    pub service: Arc<SentimentService>,

    /// Prometheus metrics handle for rendering; absent in tests
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the store from config and run the initial load.
    ///
    /// Blocks on file I/O. A failed load still yields a usable state.
    pub fn new(config: ServerConfig, metrics_handle: Option<PrometheusHandle>) -> Self {
        let paths = config.artifact_paths();
        info!(
            vectorizer = %paths.vectorizer.display(),
            classifier = %paths.classifier.display(),
            "initializing sentiment service"
        );
        let service = SentimentService::start(ArtifactStore::new(paths));
        Self::with_service(config, service, metrics_handle)
    }

    pub fn with_service(
        config: ServerConfig,
        service: SentimentService,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        metrics::gauge!("reviewpulse_models_loaded").set(loaded_gauge(&service));
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            metrics_handle,
        }
    }
}

pub(crate) fn loaded_gauge(service: &SentimentService) -> f64 {
    if service.state().is_ready() {
        1.0
    } else {
        0.0
    }
}
