//! Capability traits for the two artifacts and the feature vector they share

use reviewpulse_core::{Error, Result};

/// Sparse feature vector with a fixed width
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    /// Non-zero entries sorted by index, indices unique and `< dim`
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build a vector from `(index, value)` pairs.
    ///
    /// Duplicate indices are summed, zeros dropped. Indices outside `dim`
    /// are an inference error since they mean the producer disagrees with
    /// its own declared width.
    pub fn new(dim: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Result<Self> {
        let mut entries: Vec<(usize, f64)> = entries.into_iter().collect();
        if let Some(&(idx, _)) = entries.iter().find(|(idx, _)| *idx >= dim) {
            return Err(Error::inference(format!(
                "feature index {idx} out of range for width {dim}"
            )));
        }
        entries.sort_by_key(|(idx, _)| *idx);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, value) in entries {
            if let Some(last) = merged.last_mut() {
                if last.0 == idx {
                    last.1 += value;
                    continue;
                }
            }
            merged.push((idx, value));
        }
        merged.retain(|(_, value)| *value != 0.0);

        Ok(Self {
            dim,
            entries: merged,
        })
    }

    /// All-zero vector of the given width
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Value at `idx`, zero when absent
    pub fn get(&self, idx: usize) -> f64 {
        self.entries
            .binary_search_by_key(&idx, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense weight row of the same width
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(idx, value)| value * weights[*idx])
            .sum()
    }

    /// Fail unless the vector has exactly `expected` features
    pub fn check_width(&self, expected: usize) -> Result<()> {
        if self.dim != expected {
            return Err(Error::inference(format!(
                "feature vector has {} features, classifier expects {}",
                self.dim, expected
            )));
        }
        Ok(())
    }
}

/// Turns normalized text into a fixed-width feature vector
pub trait Vectorizer: Send + Sync {
    /// Vectorize a single document
    fn transform(&self, text: &str) -> Result<FeatureVector>;

    /// Width of every vector this vectorizer produces
    fn n_features(&self) -> usize;

    /// Model family tag, as written in the artifact
    fn kind(&self) -> &'static str;
}

/// Maps a feature vector to a label and a class distribution
pub trait Classifier: Send + Sync {
    /// Class labels in model order
    fn classes(&self) -> &[String];

    /// Expected input width
    fn n_features(&self) -> usize;

    /// Most likely label
    fn predict(&self, features: &FeatureVector) -> Result<String>;

    /// Probability per class, aligned with [`Classifier::classes`].
    ///
    /// Classifiers without a probability model return an inference error.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// Model family tag, as written in the artifact
    fn kind(&self) -> &'static str;
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable softmax
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest score, first one wins on ties
pub(crate) fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
