//! Text normalization applied to every review before vectorization.
//!
//! The vectorizer vocabulary was built from lowercase ASCII alphabetic
//! tokens, so everything else (digits, punctuation, non-Latin scripts) is
//! dropped here rather than left for the vectorizer to ignore.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Token substituted for input that normalizes to nothing
pub const EMPTY_SENTINEL: &str = "no_text";

/// Review text after normalization.
///
/// Holds either lowercase ASCII letters separated by single spaces, or the
/// [`EMPTY_SENTINEL`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the input carried no usable characters
    pub fn is_sentinel(&self) -> bool {
        self.0 == EMPTY_SENTINEL
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whitespace for tokenization: Unicode whitespace plus the ASCII
/// information separators (U+001C to U+001F).
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Normalize raw review text. Total: never fails, never returns empty text.
pub fn normalize(input: &str) -> NormalizedText {
    let filtered: String = input
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if is_separator(c) {
                Some(' ')
            } else if c.is_ascii_lowercase() {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let mut out = String::with_capacity(filtered.len());
    for word in filtered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        NormalizedText(EMPTY_SENTINEL.to_string())
    } else {
        NormalizedText(out)
    }
}

/// Coerce an arbitrary JSON value into review text.
///
/// Top-level strings pass through. Other values render the way the model's
/// training pipeline stringified them: `null` as `None`, booleans as
/// `True`/`False`, containers with `", "` and `": "` separators and quoted
/// nested strings (`['Loved', 'it']`).
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => {
            let mut out = String::new();
            write_display(&mut out, other);
            out
        }
    }
}

fn write_display(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('\'');
            out.push_str(s);
            out.push('\'');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_display(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('\'');
                out.push_str(key);
                out.push_str("': ");
                write_display(out, item);
            }
            out.push('}');
        }
    }
}

/// Coerce then normalize a JSON value
pub fn normalize_value(value: &Value) -> NormalizedText {
    normalize(&coerce_text(value))
}
