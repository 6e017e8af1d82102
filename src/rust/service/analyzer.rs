use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use crate::classifier::{ClassifierError, RawScore, ScoreClassifier};
use crate::emotion::{clean_text, EmotionReducer, EmotionResult};

/// Default deadline for one classifier call
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// A parsed `POST /api/emotion` body.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionRequest {
    /// `None` when the caller sent `"text": null`
    pub text: Option<String>,
    /// Opaque caller value echoed back unchanged
    pub timestamp: Value,
}

impl EmotionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            timestamp: Value::Null,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Value) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Parses a JSON request body.
    ///
    /// An object without a `text` key, and a JSON `null` body, are rejected with
    /// [`ApiError::NoText`]. A body that is not JSON, a non-object body and a
    /// `text` that is neither a string nor null are [`ApiError::Internal`].
    pub fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        let value = serde_json::from_slice::<Value>(body)
            .map_err(|e| ApiError::Internal(format!("malformed JSON body: {}", e)))?;
        let mut fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Err(ApiError::NoText),
            other => {
                return Err(ApiError::Internal(format!("request body is not a JSON object: {}", json_type(&other))));
            }
        };
        let text = match fields.remove("text") {
            None => return Err(ApiError::NoText),
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) => None,
            Some(other) => {
                return Err(ApiError::Internal(format!("text field is a {}, not a string", json_type(&other))));
            }
        };
        Ok(Self {
            text,
            timestamp: fields.remove("timestamp").unwrap_or(Value::Null),
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The `POST /api/emotion` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionResponse {
    /// The cleaned text that was classified
    pub text: String,
    #[serde(flatten)]
    pub result: EmotionResult,
    pub timestamp: Value,
}

/// Runs cleanup, classification and reduction for one request.
///
/// Holds only shared, immutable state and is cheap to clone.
#[derive(Clone)]
pub struct EmotionAnalyzer {
    classifier: Option<Arc<dyn ScoreClassifier>>,
    reducer: EmotionReducer,
    timeout: Duration,
}

impl EmotionAnalyzer {
    pub fn new(classifier: Option<Arc<dyn ScoreClassifier>>, reducer: EmotionReducer) -> Self {
        Self {
            classifier,
            reducer,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls the classifier on the blocking pool under the configured deadline.
    ///
    /// A panic inside the classifier and an expired deadline are both reported
    /// as errors. An expired call keeps running to completion in the
    /// background; its result is discarded.
    pub async fn classify(&self, text: &str) -> Result<Vec<RawScore>, ClassifierError> {
        let classifier = self.classifier.clone().ok_or(ClassifierError::Unavailable)?;
        let owned = text.to_owned();
        let task = tokio::task::spawn_blocking(move || classifier.classify(&owned));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(ClassifierError::PredictionError(format!("Classifier task failed: {}", join_error))),
            Err(_) => Err(ClassifierError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))),
        }
    }

    /// Emotion for already-cleaned text; never fails.
    pub async fn emotion_for(&self, text: &str) -> EmotionResult {
        let outcome = self.classify(text).await;
        self.reducer.reduce_outcome(outcome)
    }

    pub async fn analyze(&self, request: EmotionRequest) -> Result<EmotionResponse, ApiError> {
        let text = clean_text(request.text.as_deref());
        if text.is_empty() {
            return Err(ApiError::EmptyText);
        }

        let result = self.emotion_for(&text).await;
        log::debug!("Classified {} chars as {} ({})", text.len(), result.emotion, result.confidence);

        Ok(EmotionResponse {
            text,
            result,
            timestamp: request.timestamp,
        })
    }
}
