//! Serving façade: predict, reload and health over the artifact store

use crate::artifact::{SUPPORTED_CLASSIFIERS, SUPPORTED_VECTORIZERS};
use crate::engine;
use crate::store::ArtifactStore;
use reviewpulse_core::{normalize, Error, PredictionResult, Result, ServiceState, StoreStatus};
use serde::Serialize;
use tracing::{info, warn};

/// Result of a reload request
#[derive(Debug, Clone, Serialize)]
pub struct ReloadOutcome {
    pub success: bool,
    pub message: String,
    pub state: ServiceState,
}

/// Health snapshot. Built from status reads only.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub state: ServiceState,
    pub models_loaded: bool,
    pub store: StoreStatus,
    pub supported_vectorizers: &'static [&'static str],
    pub supported_classifiers: &'static [&'static str],
}

/// Sentiment service over one artifact store.
///
/// `Uninitialized` until the first load finishes, then `Ready` while a
/// complete pair is active, `Degraded` otherwise. A failed reload after a
/// successful one keeps serving the previous pair.
#[derive(Debug)]
pub struct SentimentService {
    store: ArtifactStore,
}

impl SentimentService {
    /// Wrap a store without loading anything
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Wrap a store and run the initial load. Never fails; a failed load
    /// leaves the service `Degraded`.
    pub fn start(store: ArtifactStore) -> Self {
        let service = Self::new(store);
        let outcome = service.reload();
        if outcome.success {
            info!("service ready");
        } else {
            warn!(message = %outcome.message, "service starting degraded");
        }
        service
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn state(&self) -> ServiceState {
        self.store.service_state()
    }

    /// Classify raw review text
    pub fn predict(&self, raw: &str) -> Result<PredictionResult> {
        let artifacts = self.store.current().ok_or(Error::NotReady)?;
        let text = normalize(raw);
        engine::predict(&artifacts, &text)
    }

    /// Reload both artifacts. Safe to call concurrently; calls are
    /// serialized by the store.
    pub fn reload(&self) -> ReloadOutcome {
        match self.store.load() {
            Ok(()) => ReloadOutcome {
                success: true,
                message: "Models reloaded successfully".to_string(),
                state: self.state(),
            },
            Err(e) => ReloadOutcome {
                success: false,
                message: format!("Failed to reload models: {e}"),
                state: self.state(),
            },
        }
    }

    /// Current state plus artifact diagnostics, all from one store snapshot
    pub fn health(&self) -> HealthReport {
        let store = self.store.status();
        let state = ServiceState::from_status(&store);
        HealthReport {
            models_loaded: state.is_ready(),
            state,
            store,
            supported_vectorizers: SUPPORTED_VECTORIZERS,
            supported_classifiers: SUPPORTED_CLASSIFIERS,
        }
    }
}
