//! Text cleanup and reduction of classifier scores to five coarse emotions.

mod categories;
mod normalizer;
mod reducer;

pub use categories::{parse_alias, CategoryInfo, EmotionCategory, EmotionMappingTable};
pub use normalizer::clean_text;
pub use reducer::{round_confidence, EmotionReducer, EmotionResult, FALLBACK_CONFIDENCE};
