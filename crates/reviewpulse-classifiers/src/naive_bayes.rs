//! Multinomial naive Bayes over term counts or TF-IDF weights

use crate::classifier::{argmax, softmax, Classifier, FeatureVector};
use reviewpulse_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Artifact payload for a multinomial naive Bayes classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesSpec {
    pub classes: Vec<String>,
    /// Log prior per class
    pub class_log_prior: Vec<f64>,
    /// Log likelihood per class and feature
    pub feature_log_prob: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    pub fn from_spec(spec: NaiveBayesSpec) -> std::result::Result<Self, String> {
        let n_classes = spec.classes.len();
        if n_classes < 2 {
            return Err(format!("need at least 2 classes, got {n_classes}"));
        }
        if spec.class_log_prior.len() != n_classes || spec.feature_log_prob.len() != n_classes {
            return Err(format!(
                "expected {n_classes} priors and likelihood rows, got {} and {}",
                spec.class_log_prior.len(),
                spec.feature_log_prob.len()
            ));
        }
        let n_features = spec.feature_log_prob[0].len();
        if n_features == 0 || spec.feature_log_prob.iter().any(|row| row.len() != n_features) {
            return Err("feature_log_prob rows are empty or uneven".to_string());
        }
        // log-probabilities are <= 0; -inf is a legal zero probability
        let valid = spec
            .feature_log_prob
            .iter()
            .flatten()
            .chain(spec.class_log_prior.iter())
            .all(|lp| !lp.is_nan() && *lp <= 0.0);
        if !valid {
            return Err("log probabilities must be <= 0".to_string());
        }

        Ok(Self {
            classes: spec.classes,
            class_log_prior: spec.class_log_prior,
            feature_log_prob: spec.feature_log_prob,
            n_features,
        })
    }

    /// Joint log likelihood per class
    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        features.check_width(self.n_features)?;
        if features.entries().iter().any(|(_, v)| *v < 0.0) {
            return Err(Error::inference("naive Bayes requires non-negative features"));
        }
        Ok(self
            .feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(row, prior)| features.dot(row) + prior)
            .collect())
    }
}

impl Classifier for MultinomialNb {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let jll = self.joint_log_likelihood(features)?;
        let idx = argmax(&jll).ok_or_else(|| Error::inference("empty likelihood"))?;
        Ok(self.classes[idx].clone())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let jll = self.joint_log_likelihood(features)?;
        if jll.iter().all(|l| *l == f64::NEG_INFINITY) {
            return Err(Error::inference("every class has zero likelihood"));
        }
        Ok(softmax(&jll))
    }

    fn kind(&self) -> &'static str {
        "multinomial_nb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> NaiveBayesSpec {
        NaiveBayesSpec {
            classes: vec!["negative".into(), "positive".into()],
            class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: vec![
                vec![0.8f64.ln(), 0.2f64.ln()],
                vec![0.2f64.ln(), 0.8f64.ln()],
            ],
        }
    }

    #[test]
    fn test_counts_shift_prediction() {
        let nb = MultinomialNb::from_spec(spec()).unwrap();
        let x = FeatureVector::new(2, vec![(1, 2.0)]).unwrap();
        assert_eq!(nb.predict(&x).unwrap(), "positive");

        let p = nb.predict_proba(&x).unwrap();
        // 0.8^2 / (0.8^2 + 0.2^2)
        assert!((p[1] - 0.64 / 0.68).abs() < 1e-12);
    }

    #[test]
    fn test_empty_vector_falls_back_to_prior() {
        let nb = MultinomialNb::from_spec(spec()).unwrap();
        let p = nb.predict_proba(&FeatureVector::zeros(2)).unwrap();
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_positive_log_prob() {
        let mut bad = spec();
        bad.class_log_prior[0] = 0.3;
        assert!(MultinomialNb::from_spec(bad).is_err());
    }

    #[test]
    fn test_rejects_negative_features() {
        let nb = MultinomialNb::from_spec(spec()).unwrap();
        let x = FeatureVector::new(2, vec![(0, -1.0)]).unwrap();
        assert!(matches!(nb.predict(&x), Err(Error::Inference(_))));
    }
}
