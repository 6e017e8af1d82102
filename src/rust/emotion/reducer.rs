use std::sync::Arc;
use serde::Serialize;

use super::categories::{EmotionCategory, EmotionMappingTable};
use crate::classifier::{ClassifierError, RawScore};

/// Confidence reported when no classification is available
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// The reduced emotion for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionResult {
    pub emotion: &'static str,
    pub emoji: &'static str,
    #[serde(rename = "color")]
    pub color_hex: &'static str,
    pub confidence: f64,
}

impl EmotionResult {
    pub fn from_category(category: EmotionCategory, confidence: f64) -> Self {
        let info = category.info();
        Self {
            emotion: info.display_label,
            emoji: info.emoji,
            color_hex: info.color_hex,
            confidence,
        }
    }

    /// Neutral at 0.5, returned whenever the classifier is missing, fails or
    /// produces nothing usable.
    pub fn fallback() -> Self {
        Self::from_category(EmotionCategory::Neutral, FALLBACK_CONFIDENCE)
    }
}

/// Reduces a fine-grained score distribution to one coarse category.
#[derive(Debug, Clone, Default)]
pub struct EmotionReducer {
    table: Arc<EmotionMappingTable>,
}

impl EmotionReducer {
    pub fn new(table: Arc<EmotionMappingTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &EmotionMappingTable {
        &self.table
    }

    /// Picks the highest-scoring label and maps it onto the category table.
    ///
    /// Ties keep the first label in input order. Scores that are not finite
    /// numbers are skipped; an empty (or all-skipped) input gives
    /// [`EmotionResult::fallback`].
    pub fn reduce(&self, scores: &[RawScore]) -> EmotionResult {
        let best = scores
            .iter()
            .filter(|s| s.score.is_finite())
            .fold(None::<&RawScore>, |best, candidate| match best {
                Some(current) if candidate.score <= current.score => Some(current),
                _ => Some(candidate),
            });

        let Some(best) = best else {
            log::debug!("No usable scores among {} entries, using fallback", scores.len());
            return EmotionResult::fallback();
        };

        let category = self.table.category(&best.label);
        log::debug!("Top label '{}' ({:.4}) -> {}", best.label, best.score, category);
        EmotionResult::from_category(category, round_confidence(best.score))
    }

    /// Reduces the outcome of a classifier call; every failure becomes the fallback.
    pub fn reduce_outcome(&self, outcome: Result<Vec<RawScore>, ClassifierError>) -> EmotionResult {
        match outcome {
            Ok(scores) => self.reduce(&scores),
            Err(ClassifierError::Unavailable) => {
                log::debug!("No classifier loaded, using fallback");
                EmotionResult::fallback()
            }
            Err(e) => {
                log::warn!("Emotion classification failed, using fallback: {}", e);
                EmotionResult::fallback()
            }
        }
    }
}

/// Clamps to [0, 1] and rounds to 3 decimals, halves away from zero.
pub fn round_confidence(score: f64) -> f64 {
    (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}
