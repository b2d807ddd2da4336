//! Linear classifiers: logistic regression and linear SVM

use crate::classifier::{argmax, sigmoid, softmax, Classifier, FeatureVector};
use reviewpulse_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a multi-row logistic regression turns scores into probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all rows
    #[default]
    Multinomial,
    /// Independent sigmoid per row, renormalized
    Ovr,
}

/// Artifact payload shared by linear models.
///
/// Binary problems carry a single coefficient row scoring the second class;
/// multi-class problems carry one row per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSpec {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

/// Validated weights of a linear decision function
#[derive(Debug, Clone)]
struct LinearModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LinearModel {
    fn from_spec(spec: &LinearSpec) -> std::result::Result<Self, String> {
        let n_classes = spec.classes.len();
        if n_classes < 2 {
            return Err(format!("need at least 2 classes, got {n_classes}"));
        }
        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if spec.coef.len() != expected_rows {
            return Err(format!(
                "coef has {} rows, expected {expected_rows} for {n_classes} classes",
                spec.coef.len()
            ));
        }
        if spec.intercept.len() != expected_rows {
            return Err(format!(
                "intercept has {} entries, expected {expected_rows}",
                spec.intercept.len()
            ));
        }

        let n_features = spec.coef[0].len();
        if n_features == 0 {
            return Err("coef rows are empty".to_string());
        }
        if spec.coef.iter().any(|row| row.len() != n_features) {
            return Err("coef rows have different lengths".to_string());
        }
        let all_finite = spec
            .coef
            .iter()
            .flatten()
            .chain(spec.intercept.iter())
            .all(|w| w.is_finite());
        if !all_finite {
            return Err("coef or intercept contains non-finite values".to_string());
        }

        Ok(Self {
            classes: spec.classes.clone(),
            coef: spec.coef.clone(),
            intercept: spec.intercept.clone(),
            n_features,
        })
    }

    fn decision_function(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        features.check_width(self.n_features)?;
        Ok(self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| features.dot(row) + b)
            .collect())
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let scores = self.decision_function(features)?;
        let idx = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores).ok_or_else(|| Error::inference("empty decision function"))?
        };
        Ok(self.classes[idx].clone())
    }
}

/// Logistic regression with probability output
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    model: LinearModel,
    multi_class: MultiClass,
}

impl LogisticRegression {
    pub fn from_spec(spec: LinearSpec) -> std::result::Result<Self, String> {
        Ok(Self {
            model: LinearModel::from_spec(&spec)?,
            multi_class: spec.multi_class,
        })
    }
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.model.classes
    }

    fn n_features(&self) -> usize {
        self.model.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        self.model.predict(features)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let scores = self.model.decision_function(features)?;
        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }
        match self.multi_class {
            MultiClass::Multinomial => Ok(softmax(&scores)),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().map(|s| sigmoid(*s)).collect();
                let total: f64 = raw.iter().sum();
                if total <= 0.0 {
                    return Err(Error::inference("one-vs-rest probabilities sum to zero"));
                }
                Ok(raw.into_iter().map(|p| p / total).collect())
            }
        }
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

/// Linear support vector classifier. Has no probability model.
#[derive(Debug, Clone)]
pub struct LinearSvc {
    model: LinearModel,
}

impl LinearSvc {
    pub fn from_spec(spec: LinearSpec) -> std::result::Result<Self, String> {
        Ok(Self {
            model: LinearModel::from_spec(&spec)?,
        })
    }
}

impl Classifier for LinearSvc {
    fn classes(&self) -> &[String] {
        &self.model.classes
    }

    fn n_features(&self) -> usize {
        self.model.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        self.model.predict(features)
    }

    fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>> {
        Err(Error::inference(
            "linear_svc does not provide probability estimates",
        ))
    }

    fn kind(&self) -> &'static str {
        "linear_svc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_spec() -> LinearSpec {
        LinearSpec {
            classes: vec!["negative".into(), "positive".into()],
            coef: vec![vec![2.0, -3.0]],
            intercept: vec![0.0],
            multi_class: MultiClass::default(),
        }
    }

    #[test]
    fn test_binary_logistic_regression() {
        let model = LogisticRegression::from_spec(binary_spec()).unwrap();
        let x = FeatureVector::new(2, vec![(0, 1.0)]).unwrap();

        assert_eq!(model.predict(&x).unwrap(), "positive");
        let p = model.predict_proba(&x).unwrap();
        assert!((p[1] - sigmoid(2.0)).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);

        let y = FeatureVector::new(2, vec![(1, 1.0)]).unwrap();
        assert_eq!(model.predict(&y).unwrap(), "negative");
    }

    #[test]
    fn test_zero_score_picks_first_class() {
        let model = LogisticRegression::from_spec(binary_spec()).unwrap();
        let x = FeatureVector::zeros(2);
        assert_eq!(model.predict(&x).unwrap(), "negative");
        assert_eq!(model.predict_proba(&x).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_multinomial_three_classes() {
        let spec = LinearSpec {
            classes: vec!["negative".into(), "neutral".into(), "positive".into()],
            coef: vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]],
            intercept: vec![0.0, 0.5, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        let model = LogisticRegression::from_spec(spec).unwrap();
        let x = FeatureVector::new(2, vec![(1, 3.0)]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), "positive");
        let p = model.predict_proba(&x).unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ovr_normalizes() {
        let spec = LinearSpec {
            classes: vec!["a".into(), "b".into(), "c".into()],
            coef: vec![vec![1.0], vec![0.0], vec![-1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class: MultiClass::Ovr,
        };
        let model = LogisticRegression::from_spec(spec).unwrap();
        let p = model
            .predict_proba(&FeatureVector::new(1, vec![(0, 1.0)]).unwrap())
            .unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > p[1] && p[1] > p[2]);
    }

    #[test]
    fn test_shape_validation() {
        let mut spec = binary_spec();
        spec.coef.push(vec![0.0, 0.0]);
        assert!(LogisticRegression::from_spec(spec).is_err());

        let mut spec = binary_spec();
        spec.classes.truncate(1);
        assert!(LogisticRegression::from_spec(spec).is_err());

        let mut spec = binary_spec();
        spec.intercept = vec![f64::NAN];
        assert!(LogisticRegression::from_spec(spec).is_err());
    }

    #[test]
    fn test_width_mismatch_is_inference_error() {
        let model = LogisticRegression::from_spec(binary_spec()).unwrap();
        let x = FeatureVector::zeros(3);
        assert!(matches!(model.predict(&x), Err(Error::Inference(_))));
    }

    #[test]
    fn test_svc_has_no_probabilities() {
        let model = LinearSvc::from_spec(binary_spec()).unwrap();
        let x = FeatureVector::new(2, vec![(0, 1.0)]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), "positive");
        assert!(matches!(model.predict_proba(&x), Err(Error::Inference(_))));
    }
}
