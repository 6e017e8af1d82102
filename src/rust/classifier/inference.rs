use tokenizers::Tokenizer;
use ort::session::Session;
use ndarray::{Array1, Array2};
use ort::value::Tensor;
use std::collections::HashMap;

use super::error::ClassifierError;

/// Runs a sequence-classification ONNX model over a single text.
///
/// The ONNX model is expected to:
/// - Accept `input_ids` and optionally `attention_mask` / `token_type_ids`
///   (all shape [batch_size, sequence_length])
/// - Output logits of shape [batch_size, num_labels]
pub(crate) trait SequenceClassification {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Counts the number of tokens the model will see for `text`,
    /// after truncation and special tokens.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized
    /// - `TokenizerError` if the text cannot be encoded
    fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        self.tokenize(text).map(|(ids, _)| ids.len())
    }

    /// Encodes text into token ids and the matching attention mask.
    ///
    /// Truncation is configured on the tokenizer itself, so long inputs are
    /// cut to the model's maximum sequence length rather than rejected.
    fn tokenize(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>), ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;

        let encoding = tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = encoding.get_attention_mask().iter().map(|&m| i64::from(m)).collect();

        if ids.is_empty() {
            return Err(ClassifierError::TokenizerError("Tokenizer produced no tokens".into()));
        }
        Ok((ids, mask))
    }

    /// Runs the model and returns the logits row for the single input text.
    ///
    /// # Errors
    /// - `ModelError` if the session is not initialized
    /// - `ModelError` if tensor creation or model execution fails
    /// - `ModelError` if the output is not shaped [1, num_labels]
    fn logits(&self, text: &str) -> Result<Array1<f32>, ClassifierError> {
        let session = self.session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;
        let (ids, mask) = self.tokenize(text)?;
        let seq_len = ids.len();

        let mut input_tensors = HashMap::new();
        for input in &session.inputs {
            let values = match input.name.as_str() {
                "input_ids" => ids.clone(),
                "attention_mask" => mask.clone(),
                "token_type_ids" => vec![0i64; seq_len],
                other => {
                    return Err(ClassifierError::ModelError(format!("Unsupported model input '{}'", other)));
                }
            };
            let array = Array2::from_shape_vec((1, seq_len), values)
                .map_err(|e| ClassifierError::ModelError(format!("Failed to create {} array: {}", input.name, e)))?;
            let tensor = Tensor::from_array(array)
                .map_err(|e| ClassifierError::ModelError(format!("Failed to create {} tensor: {}", input.name, e)))?;
            input_tensors.insert(input.name.as_str(), tensor);
        }

        let outputs = session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        let shape = output_tensor.shape();
        if shape.len() != 2 || shape[0] != 1 {
            return Err(ClassifierError::ModelError(
                format!("Expected logits shaped [1, num_labels], got {:?}", shape)
            ));
        }

        Ok(Array1::from_iter(output_tensor.slice(ndarray::s![0, ..]).iter().cloned()))
    }
}
