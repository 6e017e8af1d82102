//! Built-in emotion models that can be downloaded and loaded by name.

/// Static facts about a model that the loader needs before touching the files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCharacteristics {
    /// Maximum number of tokens the model accepts, special tokens included
    pub max_sequence_length: usize,
    /// Width of the classification head
    pub num_labels: usize,
    /// Approximate size of the ONNX file
    pub model_size_mb: usize,
}

/// Where to fetch a model's files from, and the SHA-256 pins to verify them against.
///
/// A `None` hash skips verification for that file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub config_url: String,
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
    pub config_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModel {
    /// English DistilRoBERTa fine-tuned on seven emotions
    /// (anger, disgust, fear, joy, neutral, sadness, surprise)
    EmotionDistilRoberta,
}

const EMOTION_DISTILROBERTA_REPO: &str =
    "https://huggingface.co/j-hartmann/emotion-english-distilroberta-base/resolve/main";

impl BuiltinModel {
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            BuiltinModel::EmotionDistilRoberta => ModelCharacteristics {
                max_sequence_length: 512,
                num_labels: 7,
                model_size_mb: 330,
            },
        }
    }

    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinModel::EmotionDistilRoberta => ModelInfo {
                name: "emotion-english-distilroberta-base".to_string(),
                model_url: format!("{}/onnx/model.onnx", EMOTION_DISTILROBERTA_REPO),
                tokenizer_url: format!("{}/tokenizer.json", EMOTION_DISTILROBERTA_REPO),
                config_url: format!("{}/config.json", EMOTION_DISTILROBERTA_REPO),
                model_hash: None,
                tokenizer_hash: None,
                config_hash: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_model_info() {
        let info = BuiltinModel::EmotionDistilRoberta.get_model_info();
        assert_eq!(info.name, "emotion-english-distilroberta-base");
        assert!(info.model_url.ends_with("model.onnx"));
        assert!(info.tokenizer_url.ends_with("tokenizer.json"));
        assert!(info.config_url.ends_with("config.json"));
    }

    #[test]
    fn test_builtin_model_characteristics() {
        let characteristics = BuiltinModel::EmotionDistilRoberta.characteristics();
        assert_eq!(characteristics.num_labels, 7);
        assert_eq!(characteristics.max_sequence_length, 512);
    }
}
