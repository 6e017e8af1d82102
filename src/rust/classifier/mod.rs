use std::str::FromStr;
use serde::{Deserialize, Serialize};

mod error;
mod inference;
mod model;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use model::EmotionModel;
pub use builder::EmotionModelBuilder;

/// One element of a classifier's output: a fine-grained label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    pub label: String,
    pub score: f64,
}

impl RawScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A model that scores text against a fixed vocabulary of emotion labels.
///
/// Implementations return one [`RawScore`] per vocabulary label, in a stable
/// order. Scores are independent confidences and need not sum to 1.
///
/// The trait is object safe so the service can hold an
/// `Arc<dyn ScoreClassifier>` and tests can substitute a mock.
pub trait ScoreClassifier: Send + Sync {
    /// Scores a cleaned, non-empty string.
    fn classify(&self, text: &str) -> Result<Vec<RawScore>, ClassifierError>;

    /// Labels this classifier can emit, in output order
    fn labels(&self) -> Vec<String>;
}

/// How raw logits are turned into per-label scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreFunction {
    /// Scores form a distribution over labels (single-label heads)
    #[default]
    Softmax,
    /// Each label scored independently (multi-label heads)
    Sigmoid,
}

impl FromStr for ScoreFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "softmax" => Ok(Self::Softmax),
            "sigmoid" => Ok(Self::Sigmoid),
            other => Err(format!("unknown score function '{}' (expected softmax or sigmoid)", other)),
        }
    }
}

/// Information about a loaded emotion model
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the tokenizer file
    pub tokenizer_path: String,
    /// Labels in output order
    pub labels: Vec<String>,
    /// Maximum number of tokens fed to the model
    pub max_sequence_length: usize,
    /// Function applied to logits
    pub score_function: ScoreFunction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_function_parsing() {
        assert_eq!("softmax".parse::<ScoreFunction>(), Ok(ScoreFunction::Softmax));
        assert_eq!(" Sigmoid ".parse::<ScoreFunction>(), Ok(ScoreFunction::Sigmoid));
        assert!("relu".parse::<ScoreFunction>().is_err());
    }
}
