//! Transcript cleanup applied before text reaches the classifier.
//!
//! Only two things change: whitespace runs collapse to a single space, and
//! the speech disfluencies `um`, `uh`, `er` and `ah` are dropped when they
//! stand as whole words. Case and punctuation are left alone.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Filler tokens, whole words only, any case
    static ref FILLER_REGEX: Regex = Regex::new(r"(?i)\b(?:um|uh|er|ah)\b").unwrap();
}

/// Cleans transcript text for classification.
///
/// `None` and empty input give an empty string. The result never contains
/// leading, trailing or repeated whitespace, and cleaning is idempotent.
///
/// ```
/// use silentaid::clean_text;
///
/// assert_eq!(clean_text(Some("ahead of uh schedule")), "ahead of schedule");
/// assert_eq!(clean_text(Some("  hello\n\tworld  ")), "hello world");
/// assert_eq!(clean_text(None), "");
/// ```
pub fn clean_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }

    let collapsed = collapse_whitespace(text);
    let without_fillers = FILLER_REGEX.replace_all(&collapsed, "");
    // removing a filler leaves its neighbouring spaces behind
    collapse_whitespace(&without_fillers)
}

/// Collapses every whitespace run to one ASCII space and trims both ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
