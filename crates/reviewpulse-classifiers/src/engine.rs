//! Inference engine: normalized text -> vectorizer -> classifier -> result

use crate::store::Artifacts;
use reviewpulse_core::{ClassProbability, Error, NormalizedText, PredictionResult, Result};
use std::time::Instant;
use tracing::debug;

/// Run one prediction against an artifact pair.
///
/// Confidence is `max(predict_proba)`, with no thresholding or calibration.
/// Every failure comes back as [`Error::Inference`]; there is no fallback
/// label.
pub fn predict(artifacts: &Artifacts, text: &NormalizedText) -> Result<PredictionResult> {
    let start = Instant::now();
    let vectorizer = artifacts.vectorizer();
    let classifier = artifacts.classifier();

    let features = vectorizer
        .transform(text.as_str())
        .map_err(|e| as_inference("vectorize", e))?;
    features
        .check_width(classifier.n_features())
        .map_err(|e| as_inference("vectorize", e))?;

    let label = classifier
        .predict(&features)
        .map_err(|e| as_inference("predict", e))?;
    let probabilities = classifier
        .predict_proba(&features)
        .map_err(|e| as_inference("predict_proba", e))?;

    let classes = classifier.classes();
    if probabilities.len() != classes.len() {
        return Err(Error::inference(format!(
            "classifier returned {} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        )));
    }
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(Error::inference("classifier returned non-finite probabilities"));
    }
    if !classes.contains(&label) {
        return Err(Error::inference(format!(
            "predicted label '{label}' is not one of the classifier's classes"
        )));
    }

    let confidence = probabilities
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    debug!(
        label = %label,
        confidence,
        nnz = features.nnz(),
        generation = artifacts.generation(),
        latency_us = start.elapsed().as_micros() as u64,
        "prediction complete"
    );

    Ok(PredictionResult {
        label,
        confidence,
        normalized_text: text.as_str().to_string(),
        probabilities: classes
            .iter()
            .zip(probabilities)
            .map(|(label, probability)| ClassProbability {
                label: label.clone(),
                probability,
            })
            .collect(),
    })
}

fn as_inference(stage: &str, err: Error) -> Error {
    match err {
        Error::Inference(msg) => Error::Inference(format!("{stage}: {msg}")),
        other => Error::inference(format!("{stage}: {other}")),
    }
}
