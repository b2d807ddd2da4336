//! Core types for ReviewPulse

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The two artifact slots the service loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Text vectorizer (normalized text -> feature vector)
    Vectorizer,
    /// Classifier (feature vector -> label and probabilities)
    Classifier,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vectorizer => "vectorizer",
            Self::Classifier => "classifier",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability assigned to a single class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Result of classifying one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class label
    pub label: String,

    /// Maximum class probability (0.0-1.0).
    ///
    /// This is the raw `max(predict_proba)` of the classifier. It is not a
    /// calibrated score and should not be read as one.
    pub confidence: f64,

    /// Text as seen by the vectorizer after normalization
    pub normalized_text: String,

    /// Full class distribution, in the classifier's class order
    pub probabilities: Vec<ClassProbability>,
}

/// Lifecycle state of the serving façade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// No load attempt has completed yet
    Uninitialized,
    /// Artifacts are loaded and predictions are served
    Ready,
    /// The last load failed and nothing usable is loaded
    Degraded,
}

impl ServiceState {
    /// Whether predictions can be served in this state
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// State implied by one store snapshot
    pub fn from_status(status: &StoreStatus) -> Self {
        Self::from_flags(status.loaded, status.last_attempt.is_some())
    }

    pub fn from_flags(loaded: bool, attempted: bool) -> Self {
        if loaded {
            Self::Ready
        } else if attempted {
            Self::Degraded
        } else {
            Self::Uninitialized
        }
    }

    /// Health label reported over HTTP
    pub fn health_label(&self) -> &'static str {
        if self.is_ready() {
            "healthy"
        } else {
            "degraded"
        }
    }
}

/// Filesystem facts about one artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostics {
    pub path: PathBuf,
    pub exists: bool,
    /// Size in bytes, 0 when the file is absent or unreadable
    pub size_bytes: u64,
}

impl FileDiagnostics {
    /// Stat the file at `path`. Never fails.
    pub fn probe(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Self {
                path: path.to_path_buf(),
                exists: true,
                size_bytes: meta.len(),
            },
            _ => Self {
                path: path.to_path_buf(),
                exists: false,
                size_bytes: 0,
            },
        }
    }
}

/// Outcome of the most recent load attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAttempt {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl LoadAttempt {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            finished_at: Utc::now(),
        }
    }
}

/// Snapshot of the artifact store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    /// Whether a complete artifact pair is currently active
    pub loaded: bool,

    /// Number of successful loads so far; identifies the active pair
    pub generation: u64,

    /// Type tag of the active vectorizer, if any
    pub vectorizer_type: Option<String>,

    /// Type tag of the active classifier, if any
    pub classifier_type: Option<String>,

    /// When the active pair was loaded
    pub loaded_at: Option<DateTime<Utc>>,

    /// Vectorizer file facts, recomputed on every status call
    pub vectorizer: FileDiagnostics,

    /// Classifier file facts, recomputed on every status call
    pub classifier: FileDiagnostics,

    /// Last load attempt, `None` before the first one
    pub last_attempt: Option<LoadAttempt>,
}
