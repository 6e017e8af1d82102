use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use ort::session::Session;
use serde::Deserialize;
use log::{info, error};

use super::error::ClassifierError;
use super::model::EmotionModel;
use super::ScoreFunction;
use crate::{BuiltinModel, ModelManager, runtime::{RuntimeConfig, create_session_builder}};

/// Default token limit for custom models, RoBERTa's position embedding size
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 512;

/// The part of a Hugging Face `config.json` the loader reads
#[derive(Debug, Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

/// A builder for constructing an [`EmotionModel`] with a fluent interface.
#[derive(Default, Debug)]
pub struct EmotionModelBuilder {
    model_path: Option<PathBuf>,
    tokenizer_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    labels: Option<Vec<String>>,
    max_sequence_length: usize,
    score_function: ScoreFunction,
    runtime_config: RuntimeConfig,
}

impl EmotionModelBuilder {
    /// Creates a new empty builder with default configuration
    pub fn new() -> Self {
        Self {
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            ..Self::default()
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    /// Must be called before the model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Chooses how logits become per-label scores (softmax by default)
    pub fn with_score_function(mut self, score_function: ScoreFunction) -> Self {
        self.score_function = score_function;
        self
    }

    /// Overrides the label vocabulary instead of reading `id2label` from `config.json`.
    ///
    /// Labels are given in output (logit) order.
    pub fn with_labels(mut self, labels: Vec<impl Into<String>>) -> Result<Self, ClassifierError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self::validate_labels(&labels)?;
        self.labels = Some(labels);
        Ok(self)
    }

    /// Loads a built-in model from the default model cache.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - an error if:
    ///   - A model is already set
    ///   - The model is not downloaded
    ///   - The model or tokenizer failed to load
    ///   - The model structure is invalid
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = ModelManager::new_default()
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?;
        self.with_managed_model(&manager, model)
    }

    /// Loads a built-in model from the cache owned by `manager`.
    pub fn with_managed_model(self, manager: &ModelManager, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if !manager.is_model_downloaded(model) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::download_model()",
                model
            )));
        }

        let max_sequence_length = model.characteristics().max_sequence_length;
        self.load(
            manager.get_model_path(model),
            manager.get_tokenizer_path(model),
            Some(manager.get_config_path(model)),
            max_sequence_length,
        )
    }

    /// Loads a model from a directory containing `model.onnx`, `tokenizer.json`
    /// and (unless labels are supplied with [`with_labels`](Self::with_labels))
    /// `config.json`.
    ///
    /// `max_sequence_length` defaults to 512 tokens.
    pub fn with_custom_model(
        self,
        model_dir: impl AsRef<Path>,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        let model_dir = model_dir.as_ref();
        if model_dir.as_os_str().is_empty() {
            return Err(ClassifierError::BuildError("Model directory cannot be empty".to_string()));
        }
        if !model_dir.is_dir() {
            return Err(ClassifierError::BuildError(format!("Model directory not found: {}", model_dir.display())));
        }

        let config_path = model_dir.join("config.json");
        self.load(
            model_dir.join("model.onnx"),
            model_dir.join("tokenizer.json"),
            config_path.exists().then_some(config_path),
            max_sequence_length.unwrap_or(DEFAULT_MAX_SEQUENCE_LENGTH),
        )
    }

    fn load(
        mut self,
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        config_path: Option<PathBuf>,
        max_sequence_length: usize,
    ) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths already set".to_string()));
        }
        if max_sequence_length == 0 {
            return Err(ClassifierError::ValidationError("Max sequence length must be positive".into()));
        }
        if !model_path.exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path.display())));
        }
        if !tokenizer_path.exists() {
            return Err(ClassifierError::BuildError(format!("Tokenizer file not found: {}", tokenizer_path.display())));
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| {
                error!("Failed to load tokenizer: {}", e);
                ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
            })?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| ClassifierError::TokenizerError(format!("Failed to configure truncation: {}", e)))?;
        info!("Tokenizer loaded from {}", tokenizer_path.display());

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(&model_path)?;
        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.model_path = Some(model_path);
        self.tokenizer_path = Some(tokenizer_path);
        self.config_path = config_path;
        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        self.max_sequence_length = max_sequence_length;
        Ok(self)
    }

    /// Builds and returns the final EmotionModel
    ///
    /// # Returns
    /// * `Result<EmotionModel, ClassifierError>` - an error if:
    ///   - No model has been loaded
    ///   - No labels were supplied and `config.json` is missing or invalid
    pub fn build(mut self) -> Result<EmotionModel, ClassifierError> {
        let model_path = self.model_path.take()
            .ok_or_else(|| ClassifierError::BuildError("Model and tokenizer paths must be set".to_string()))?;
        let tokenizer_path = self.tokenizer_path.take()
            .ok_or_else(|| ClassifierError::BuildError("Model and tokenizer paths must be set".to_string()))?;

        let labels = match self.labels.take() {
            Some(labels) => labels,
            None => {
                let config_path = self.config_path.take()
                    .ok_or_else(|| ClassifierError::BuildError(
                        "No labels supplied and no config.json next to the model".to_string()
                    ))?;
                Self::read_labels(&config_path)?
            }
        };
        info!("Model labels: {:?}", labels);

        let tokenizer = Arc::new(self.tokenizer.take()
            .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?);
        let session = Arc::new(self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?);

        Ok(EmotionModel {
            model_path: model_path.to_string_lossy().to_string(),
            tokenizer_path: tokenizer_path.to_string_lossy().to_string(),
            tokenizer,
            session,
            labels: Arc::new(labels),
            max_sequence_length: self.max_sequence_length,
            score_function: self.score_function,
        })
    }

    /// Reads the `id2label` table of a Hugging Face `config.json` into a
    /// label list indexed by logit position.
    fn read_labels(config_path: &Path) -> Result<Vec<String>, ClassifierError> {
        let data = fs::read_to_string(config_path)
            .map_err(|e| ClassifierError::BuildError(format!("Failed to read {}: {}", config_path.display(), e)))?;
        parse_id2label(&data)
    }

    fn validate_labels(labels: &[String]) -> Result<(), ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::ValidationError("At least one label is required".into()));
        }
        if let Some(pos) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!("Label {} cannot be empty", pos)));
        }
        Ok(())
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if !session.inputs.iter().any(|input| input.name == "input_ids") {
            return Err(ClassifierError::ModelError(
                "Model must have an input_ids input".to_string()
            ));
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        Ok(())
    }
}

pub(crate) fn parse_id2label(data: &str) -> Result<Vec<String>, ClassifierError> {
    let config: ModelConfig = serde_json::from_str(data)
        .map_err(|e| ClassifierError::BuildError(format!("Failed to parse config.json: {}", e)))?;

    let mut labels = vec![String::new(); config.id2label.len()];
    for (id, label) in config.id2label {
        let index: usize = id.parse()
            .map_err(|_| ClassifierError::BuildError(format!("Invalid label id in config.json: {}", id)))?;
        let slot = labels.get_mut(index)
            .ok_or_else(|| ClassifierError::BuildError(format!("Label id {} out of range", index)))?;
        *slot = label;
    }

    EmotionModelBuilder::validate_labels(&labels)?;
    Ok(labels)
}
