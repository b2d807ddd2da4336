//! Bag-of-words vectorizers: raw term counts and TF-IDF
//!
//! Both share the same [`Analyzer`]: regex tokenization, optional stop
//! words, then word n-grams joined by a single space.

use crate::classifier::{FeatureVector, Vectorizer};
use regex::Regex;
use reviewpulse_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Default token pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Tokenizer settings shared by every vectorizer artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSpec {
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    /// Inclusive `[min_n, max_n]` word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default)]
    pub stop_words: Vec<String>,
}

impl Default for AnalyzerSpec {
    fn default() -> Self {
        Self {
            token_pattern: default_token_pattern(),
            ngram_range: default_ngram_range(),
            stop_words: Vec::new(),
        }
    }
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Compiled tokenizer
#[derive(Debug, Clone)]
pub struct Analyzer {
    token_pattern: Regex,
    min_n: usize,
    max_n: usize,
    stop_words: HashSet<String>,
}

impl Analyzer {
    pub fn from_spec(spec: &AnalyzerSpec) -> std::result::Result<Self, String> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        let token_pattern = Regex::new(&spec.token_pattern)
            .map_err(|e| format!("invalid token_pattern: {e}"))?;

        Ok(Self {
            token_pattern,
            min_n,
            max_n,
            stop_words: spec.stop_words.iter().cloned().collect(),
        })
    }

    /// Split a document into the terms looked up in the vocabulary
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        if self.max_n == 1 {
            return tokens.into_iter().map(str::to_string).collect();
        }

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }
}

/// Vector normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    #[serde(rename = "none")]
    Unnormalized,
}

/// Artifact payload for a TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfSpec {
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,

    /// Inverse document frequency per column
    pub idf: Vec<f64>,

    #[serde(default)]
    pub norm: Norm,

    /// Use `1 + ln(tf)` instead of raw counts
    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(flatten)]
    pub analyzer: AnalyzerSpec,
}

/// Artifact payload for a raw count vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountSpec {
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,

    /// Emit 1.0 for present terms instead of counts
    #[serde(default)]
    pub binary: bool,

    #[serde(flatten)]
    pub analyzer: AnalyzerSpec,
}

/// Check that vocabulary indices cover `0..n` exactly once
fn validate_vocabulary(vocabulary: &HashMap<String, usize>) -> std::result::Result<usize, String> {
    let n = vocabulary.len();
    if n == 0 {
        return Err("vocabulary is empty".to_string());
    }
    let mut seen = vec![false; n];
    for (term, &idx) in vocabulary {
        if idx >= n {
            return Err(format!("vocabulary index {idx} for '{term}' exceeds {n} terms"));
        }
        if std::mem::replace(&mut seen[idx], true) {
            return Err(format!("vocabulary index {idx} is assigned twice"));
        }
    }
    Ok(n)
}

/// Count vocabulary hits per column
fn term_counts(
    analyzer: &Analyzer,
    vocabulary: &HashMap<String, usize>,
    text: &str,
) -> BTreeMap<usize, f64> {
    let mut counts = BTreeMap::new();
    for term in analyzer.analyze(text) {
        if let Some(&idx) = vocabulary.get(&term) {
            *counts.entry(idx).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// Term-frequency / inverse-document-frequency vectorizer
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    norm: Norm,
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    pub fn from_spec(spec: TfidfSpec) -> std::result::Result<Self, String> {
        let n = validate_vocabulary(&spec.vocabulary)?;
        if spec.idf.len() != n {
            return Err(format!(
                "idf has {} entries but vocabulary has {n} terms",
                spec.idf.len()
            ));
        }
        if let Some(bad) = spec.idf.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(format!("idf contains invalid weight {bad}"));
        }

        Ok(Self {
            analyzer: Analyzer::from_spec(&spec.analyzer)?,
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            norm: spec.norm,
            sublinear_tf: spec.sublinear_tf,
        })
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector> {
        let mut weights: Vec<(usize, f64)> = term_counts(&self.analyzer, &self.vocabulary, text)
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let scale = match self.norm {
            Norm::L1 => weights.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            Norm::L2 => weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Norm::Unnormalized => 1.0,
        };
        if scale > 0.0 {
            for (_, w) in weights.iter_mut() {
                *w /= scale;
            }
        }

        FeatureVector::new(self.idf.len(), weights)
    }

    fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn kind(&self) -> &'static str {
        "tfidf"
    }
}

/// Raw term count vectorizer
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    binary: bool,
}

impl CountVectorizer {
    pub fn from_spec(spec: CountSpec) -> std::result::Result<Self, String> {
        validate_vocabulary(&spec.vocabulary)?;
        Ok(Self {
            analyzer: Analyzer::from_spec(&spec.analyzer)?,
            vocabulary: spec.vocabulary,
            binary: spec.binary,
        })
    }
}

impl Vectorizer for CountVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector> {
        let counts = term_counts(&self.analyzer, &self.vocabulary, text);
        let binary = self.binary;
        FeatureVector::new(
            self.vocabulary.len(),
            counts
                .into_iter()
                .map(|(idx, c)| (idx, if binary { 1.0 } else { c })),
        )
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn kind(&self) -> &'static str {
        "count"
    }
}
