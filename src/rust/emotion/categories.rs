use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// The five coarse emotions exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionCategory {
    Happy,
    Sad,
    Angry,
    Excited,
    Neutral,
}

/// Display metadata for one coarse category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub display_label: &'static str,
    pub emoji: &'static str,
    pub color_hex: &'static str,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 5] = [
        EmotionCategory::Happy,
        EmotionCategory::Sad,
        EmotionCategory::Angry,
        EmotionCategory::Excited,
        EmotionCategory::Neutral,
    ];

    pub const fn info(self) -> CategoryInfo {
        match self {
            EmotionCategory::Happy => CategoryInfo { display_label: "Happy", emoji: "😊", color_hex: "#22c55e" },
            EmotionCategory::Sad => CategoryInfo { display_label: "Sad", emoji: "😢", color_hex: "#3b82f6" },
            EmotionCategory::Angry => CategoryInfo { display_label: "Angry", emoji: "😠", color_hex: "#ef4444" },
            EmotionCategory::Excited => CategoryInfo { display_label: "Excited", emoji: "🤩", color_hex: "#f97316" },
            EmotionCategory::Neutral => CategoryInfo { display_label: "Neutral", emoji: "😐", color_hex: "#6b7280" },
        }
    }

    pub const fn display_label(self) -> &'static str {
        self.info().display_label
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl FromStr for EmotionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.display_label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown emotion category '{}' (expected Happy, Sad, Angry, Excited or Neutral)", s))
    }
}

/// Fine-grained classifier labels and the coarse category each maps to
const DEFAULT_MAPPING: [(&str, EmotionCategory); 8] = [
    ("joy", EmotionCategory::Happy),
    ("happiness", EmotionCategory::Happy),
    ("sadness", EmotionCategory::Sad),
    ("anger", EmotionCategory::Angry),
    ("fear", EmotionCategory::Neutral),
    ("surprise", EmotionCategory::Excited),
    ("disgust", EmotionCategory::Neutral),
    ("neutral", EmotionCategory::Neutral),
];

/// Immutable mapping from lowercase classifier label to coarse category.
///
/// Lookups are total: labels without an entry resolve to
/// [`EmotionCategory::Neutral`], so the classifier vocabulary may exceed the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionMappingTable {
    entries: HashMap<String, EmotionCategory>,
}

impl Default for EmotionMappingTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_MAPPING
                .iter()
                .map(|&(label, category)| (label.to_string(), category))
                .collect(),
        }
    }
}

impl EmotionMappingTable {
    /// Adds or replaces the category for `label`. Only used while the table is
    /// being assembled at startup; the finished table is shared read-only.
    pub fn with_alias(mut self, label: &str, category: EmotionCategory) -> Self {
        self.entries.insert(normalize_label(label), category);
        self
    }

    /// Category for a classifier label, case-insensitively; unknown labels are Neutral.
    pub fn category(&self, label: &str) -> EmotionCategory {
        self.entries
            .get(&normalize_label(label))
            .copied()
            .unwrap_or(EmotionCategory::Neutral)
    }

    pub fn lookup(&self, label: &str) -> CategoryInfo {
        self.category(label).info()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Parses a `label=Category` alias as given on the command line.
pub fn parse_alias(alias: &str) -> Result<(String, EmotionCategory), String> {
    let (label, category) = alias
        .split_once('=')
        .ok_or_else(|| format!("expected label=Category, got '{}'", alias))?;
    let label = normalize_label(label);
    if label.is_empty() {
        return Err(format!("empty label in alias '{}'", alias));
    }
    Ok((label, category.parse()?))
}
