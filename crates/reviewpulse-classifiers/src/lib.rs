//! ReviewPulse Classifiers
//!
//! Everything between a raw review and a sentiment label:
//! - Capability traits for the two artifacts ([`Vectorizer`], [`Classifier`])
//! - Concrete model families decoded from the artifact container
//!   (TF-IDF / count vectorizers, logistic regression, linear SVM,
//!   multinomial naive Bayes)
//! - The [`ArtifactStore`] owning the active pair and its reload path
//! - The inference engine and the [`SentimentService`] façade
//!
//! All operations are synchronous and bounded by local file I/O.

pub mod artifact;
pub mod classifier;
pub mod engine;
pub mod linear;
pub mod naive_bayes;
pub mod serving;
pub mod store;
pub mod vectorizer;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use artifact::{
    decode_classifier, decode_vectorizer, encode_classifier, encode_vectorizer, ClassifierSpec,
    VectorizerSpec, SUPPORTED_CLASSIFIERS, SUPPORTED_VECTORIZERS,
};
pub use classifier::{Classifier, FeatureVector, Vectorizer};
pub use serving::{HealthReport, ReloadOutcome, SentimentService};
pub use store::{ArtifactLoader, ArtifactPaths, ArtifactStore, Artifacts, JsonArtifactLoader};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, FeatureVector, Vectorizer};
    pub use crate::serving::{ReloadOutcome, SentimentService};
    pub use crate::store::{ArtifactPaths, ArtifactStore};
}
