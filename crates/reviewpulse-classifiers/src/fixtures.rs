//! Small hand-weighted sentiment model for tests and local smoke runs.
//!
//! Enabled in this crate's own tests and, for dependents, through the
//! `fixtures` feature.

use crate::artifact::{encode_classifier, encode_vectorizer, ClassifierSpec, VectorizerSpec};
use crate::linear::{LinearSpec, MultiClass};
use crate::store::ArtifactPaths;
use crate::vectorizer::{AnalyzerSpec, Norm, TfidfSpec};
use std::path::Path;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "lr_best.json";

const TERMS: [(&str, f64, f64); 8] = [
    // term, idf, weight toward "positive"
    ("great", 1.5, 2.4),
    ("love", 1.6, 2.1),
    ("excellent", 1.9, 2.8),
    ("bad", 1.5, -2.3),
    ("terrible", 1.9, -2.9),
    ("boring", 1.8, -1.7),
    ("movie", 1.1, 0.0),
    ("no_text", 1.0, 0.0),
];

/// TF-IDF vectorizer over the fixture vocabulary
pub fn sentiment_vectorizer() -> VectorizerSpec {
    VectorizerSpec::Tfidf(TfidfSpec {
        vocabulary: TERMS
            .iter()
            .enumerate()
            .map(|(idx, (term, _, _))| (term.to_string(), idx))
            .collect(),
        idf: TERMS.iter().map(|(_, idf, _)| *idf).collect(),
        norm: Norm::L2,
        sublinear_tf: false,
        analyzer: AnalyzerSpec::default(),
    })
}

/// Binary logistic regression matching [`sentiment_vectorizer`]
pub fn sentiment_classifier() -> ClassifierSpec {
    ClassifierSpec::LogisticRegression(LinearSpec {
        classes: vec!["negative".to_string(), "positive".to_string()],
        coef: vec![TERMS.iter().map(|(_, _, w)| *w).collect()],
        intercept: vec![0.0],
        multi_class: MultiClass::default(),
    })
}

/// Encoded classifier whose width does not match the fixture vectorizer
pub fn classifier_with_width(n_features: usize) -> Vec<u8> {
    let spec = ClassifierSpec::LogisticRegression(LinearSpec {
        classes: vec!["negative".to_string(), "positive".to_string()],
        coef: vec![vec![0.5; n_features]],
        intercept: vec![0.0],
        multi_class: MultiClass::default(),
    });
    encode_classifier(&spec).unwrap_or_default()
}

/// Write both fixture artifacts into `dir` and return their paths
pub fn write_sentiment_artifacts(dir: &Path) -> std::io::Result<ArtifactPaths> {
    let paths = ArtifactPaths::in_dir(dir, VECTORIZER_FILE, CLASSIFIER_FILE);
    std::fs::write(&paths.vectorizer, encode_vectorizer(&sentiment_vectorizer())?)?;
    std::fs::write(&paths.classifier, encode_classifier(&sentiment_classifier())?)?;
    Ok(paths)
}
