//! Artifact container format and decoding
//!
//! Every artifact file is a JSON envelope:
//!
//! ```json
//! { "format": "reviewpulse-artifact", "version": 1, "kind": "classifier",
//!   "model": { "type": "logistic_regression", "classes": [...], ... } }
//! ```
//!
//! Decoding checks the envelope first, then the model type tag, then the
//! model's own structural invariants. Artifact files are assumed to come
//! from the trusted training pipeline; these checks catch corruption and
//! mix-ups, they are not a sandbox.

use crate::classifier::{Classifier, Vectorizer};
use crate::linear::{LinearSpec, LinearSvc, LogisticRegression};
use crate::naive_bayes::{MultinomialNb, NaiveBayesSpec};
use crate::vectorizer::{CountSpec, CountVectorizer, TfidfSpec, TfidfVectorizer};
use reviewpulse_core::{ArtifactKind, LoadError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Value of the `format` field
pub const ARTIFACT_FORMAT: &str = "reviewpulse-artifact";

/// Only supported container version
pub const ARTIFACT_VERSION: u32 = 1;

/// Vectorizer model types this build can decode
pub const SUPPORTED_VECTORIZERS: &[&str] = &["tfidf", "count"];

/// Classifier model types this build can decode
pub const SUPPORTED_CLASSIFIERS: &[&str] = &["logistic_regression", "linear_svc", "multinomial_nb"];

/// Outer container shared by both artifact kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<M> {
    pub format: String,
    pub version: u32,
    pub kind: ArtifactKind,
    pub model: M,
}

impl<M> ArtifactEnvelope<M> {
    pub fn new(kind: ArtifactKind, model: M) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            kind,
            model,
        }
    }
}

/// Vectorizer payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorizerSpec {
    Tfidf(TfidfSpec),
    Count(CountSpec),
}

impl VectorizerSpec {
    /// Validate and build the runtime vectorizer
    pub fn build(self) -> Result<Box<dyn Vectorizer>, String> {
        Ok(match self {
            Self::Tfidf(spec) => Box::new(TfidfVectorizer::from_spec(spec)?),
            Self::Count(spec) => Box::new(CountVectorizer::from_spec(spec)?),
        })
    }
}

/// Classifier payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LinearSpec),
    LinearSvc(LinearSpec),
    MultinomialNb(NaiveBayesSpec),
}

impl ClassifierSpec {
    /// Validate and build the runtime classifier
    pub fn build(self) -> Result<Box<dyn Classifier>, String> {
        Ok(match self {
            Self::LogisticRegression(spec) => Box::new(LogisticRegression::from_spec(spec)?),
            Self::LinearSvc(spec) => Box::new(LinearSvc::from_spec(spec)?),
            Self::MultinomialNb(spec) => Box::new(MultinomialNb::from_spec(spec)?),
        })
    }
}

/// Parse the envelope and return the still-untyped model payload
fn open_envelope(
    bytes: &[u8],
    expected: ArtifactKind,
    path: &Path,
) -> Result<serde_json::Value, LoadError> {
    let envelope: ArtifactEnvelope<serde_json::Value> = serde_json::from_slice(bytes)
        .map_err(|e| LoadError::deserialization(expected, path, format!("not an artifact container: {e}")))?;

    if envelope.format != ARTIFACT_FORMAT {
        return Err(LoadError::deserialization(
            expected,
            path,
            format!("unknown format '{}'", envelope.format),
        ));
    }
    if envelope.version != ARTIFACT_VERSION {
        return Err(LoadError::deserialization(
            expected,
            path,
            format!(
                "unsupported container version {} (expected {ARTIFACT_VERSION})",
                envelope.version
            ),
        ));
    }
    if envelope.kind != expected {
        return Err(LoadError::deserialization(
            expected,
            path,
            format!("file holds a {} artifact", envelope.kind),
        ));
    }
    Ok(envelope.model)
}

/// Decode a vectorizer artifact
pub fn decode_vectorizer(bytes: &[u8], path: &Path) -> Result<Box<dyn Vectorizer>, LoadError> {
    let kind = ArtifactKind::Vectorizer;
    let model = open_envelope(bytes, kind, path)?;
    let spec: VectorizerSpec = serde_json::from_value(model)
        .map_err(|e| LoadError::deserialization(kind, path, e.to_string()))?;
    spec.build()
        .map_err(|msg| LoadError::deserialization(kind, path, msg))
}

/// Decode a classifier artifact
pub fn decode_classifier(bytes: &[u8], path: &Path) -> Result<Box<dyn Classifier>, LoadError> {
    let kind = ArtifactKind::Classifier;
    let model = open_envelope(bytes, kind, path)?;
    let spec: ClassifierSpec = serde_json::from_value(model)
        .map_err(|e| LoadError::deserialization(kind, path, e.to_string()))?;
    spec.build()
        .map_err(|msg| LoadError::deserialization(kind, path, msg))
}

/// Serialize a vectorizer spec into artifact bytes
pub fn encode_vectorizer(spec: &VectorizerSpec) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&ArtifactEnvelope::new(ArtifactKind::Vectorizer, spec))
}

/// Serialize a classifier spec into artifact bytes
pub fn encode_classifier(spec: &ClassifierSpec) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&ArtifactEnvelope::new(ArtifactKind::Classifier, spec))
}
