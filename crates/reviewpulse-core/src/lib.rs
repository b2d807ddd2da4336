//! ReviewPulse Core
//!
//! Core types and utilities shared across ReviewPulse components.
//!
//! This crate provides:
//! - The error taxonomy used by loading, inference and the HTTP surface
//! - Shared data types for predictions and artifact status
//! - The text normalizer applied to every review before vectorization

pub mod error;
pub mod normalize;
pub mod types;

pub use error::{Error, LoadError, Result};
pub use normalize::{coerce_text, normalize, normalize_value, NormalizedText, EMPTY_SENTINEL};
pub use types::{
    ArtifactKind, ClassProbability, FileDiagnostics, LoadAttempt, PredictionResult, ServiceState,
    StoreStatus,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, LoadError, Result};
    pub use crate::normalize::{normalize, NormalizedText};
    pub use crate::types::{ArtifactKind, PredictionResult, ServiceState, StoreStatus};
}
