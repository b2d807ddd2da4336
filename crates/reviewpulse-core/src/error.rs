//! Error types for ReviewPulse

use crate::types::ArtifactKind;
use std::path::PathBuf;

/// Result type alias using ReviewPulse's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure while loading one of the two model artifacts.
///
/// Load errors never escape the serving façade: they are recorded in the
/// store status and turn the service `Degraded`.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Artifact file does not exist
    #[error("{artifact} artifact not found at {}", path.display())]
    ArtifactMissing { artifact: ArtifactKind, path: PathBuf },

    /// Artifact file exists but could not be read
    #[error("failed to read {artifact} artifact at {}: {source}", path.display())]
    Io {
        artifact: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact file could not be decoded into a usable model
    #[error("failed to decode {artifact} artifact at {}: {message}", path.display())]
    Deserialization {
        artifact: ArtifactKind,
        path: PathBuf,
        message: String,
    },

    /// The two artifacts decoded fine but do not fit together
    #[error("incompatible artifacts: {0}")]
    Incompatible(String),
}

impl LoadError {
    /// Create a decoding error for the given artifact
    pub fn deserialization(
        artifact: ArtifactKind,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Deserialization {
            artifact,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactMissing { .. } => "artifact_missing",
            Self::Io { .. } => "io",
            Self::Deserialization { .. } => "deserialization",
            Self::Incompatible(_) => "incompatible",
        }
    }
}

/// Core error type for ReviewPulse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Artifact loading errors
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Malformed or incomplete request
    #[error("validation error: {0}")]
    Validation(String),

    /// Artifacts are not loaded, the service cannot answer predictions
    #[error("models not loaded")]
    NotReady,

    /// Unexpected failure inside vectorize/classify
    #[error("inference error: {0}")]
    Inference(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Short machine-readable name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load(e) => e.kind(),
            Self::Validation(_) => "validation",
            Self::NotReady => "not_ready",
            Self::Inference(_) => "inference",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_message_names_path() {
        let err = LoadError::ArtifactMissing {
            artifact: ArtifactKind::Classifier,
            path: PathBuf::from("/models/lr_best.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("classifier"));
        assert!(msg.contains("/models/lr_best.json"));
        assert_eq!(err.kind(), "artifact_missing");
    }

    #[test]
    fn test_load_error_converts_transparently() {
        let err: Error = LoadError::Incompatible("3 vs 4 features".into()).into();
        assert_eq!(err.to_string(), "incompatible artifacts: 3 vs 4 features");
        assert_eq!(err.kind(), "incompatible");
    }
}
