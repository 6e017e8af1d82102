use std::sync::Arc;
use ort::session::Session;
use tokenizers::Tokenizer;

use super::error::ClassifierError;
use super::inference::SequenceClassification;
use super::utils::{sigmoid, softmax};
use super::{ClassifierInfo, RawScore, ScoreClassifier, ScoreFunction};

/// A thread-safe emotion classifier backed by an ONNX sequence-classification model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the tokenizer and session are
/// wrapped in `Arc` and never mutated after construction, so a single instance
/// can serve any number of concurrent requests.
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use silentaid::{EmotionModel, BuiltinModel, ScoreClassifier};
///
/// let model = EmotionModel::builder()
///     .with_model(BuiltinModel::EmotionDistilRoberta)?
///     .build()?;
///
/// for score in model.classify("I am so happy today!")? {
///     println!("{}: {:.3}", score.label, score.score);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EmotionModel {
    pub model_path: String,
    pub tokenizer_path: String,
    pub tokenizer: Arc<Tokenizer>,
    pub session: Arc<Session>,
    pub labels: Arc<Vec<String>>,
    pub max_sequence_length: usize,
    pub score_function: ScoreFunction,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<EmotionModel>();
    }
};

impl SequenceClassification for EmotionModel {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&self.session)
    }
}

impl EmotionModel {
    /// Creates a new EmotionModelBuilder for fluent construction
    pub fn builder() -> super::builder::EmotionModelBuilder {
        super::builder::EmotionModelBuilder::new()
    }

    /// Returns information about the loaded model
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            labels: self.labels.as_ref().clone(),
            max_sequence_length: self.max_sequence_length,
            score_function: self.score_function,
        }
    }

    /// Number of tokens the model sees for `text` after truncation
    pub fn token_count(&self, text: &str) -> Result<usize, ClassifierError> {
        self.count_tokens(text)
    }

    /// Scores `text` against every label, in label-id order.
    ///
    /// # Errors
    /// - `ValidationError` if `text` is empty
    /// - `ModelError` if the logits width differs from the label count
    /// - Any tokenizer or runtime error from inference
    pub fn predict(&self, text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let logits = self.logits(text)?;
        if logits.len() != self.labels.len() {
            return Err(ClassifierError::ModelError(format!(
                "Model produced {} logits for {} labels",
                logits.len(),
                self.labels.len()
            )));
        }

        let scores = match self.score_function {
            ScoreFunction::Softmax => softmax(logits.view()),
            ScoreFunction::Sigmoid => sigmoid(logits.view()),
        };

        Ok(self.labels.iter()
            .zip(scores.iter())
            .map(|(label, &score)| RawScore::new(label.clone(), f64::from(score)))
            .collect())
    }
}

impl ScoreClassifier for EmotionModel {
    fn classify(&self, text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        self.predict(text)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.as_ref().clone()
    }
}
