//! Structural feature extraction for single sentences.
//!
//! All features are pure, total functions of the input string and are
//! always computed from the original sentence, never from an
//! oracle-rendered skeleton.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Subordinating words used to approximate clause structure.
pub const CLAUSE_TRIGGERS: [&str; 7] = [
    "when",
    "because",
    "although",
    "if",
    "while",
    "since",
    "but",
];

/// Characters that participate in the punctuation pattern, in no
/// particular order. Everything else is stripped.
pub const PUNCTUATION_CHARS: &str = ".,;:!?'\"()-\u{2014}";

static CLAUSE_TRIGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(when|because|although|if|while|since|but)\b").expect("valid trigger regex")
});

/// Relative order of main and subordinate clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClauseOrder {
    MainFirst,
    SubordinateFirst,
}

impl ClauseOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainFirst => "main-first",
            Self::SubordinateFirst => "subordinate-first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "main-first" => Some(Self::MainFirst),
            "subordinate-first" => Some(Self::SubordinateFirst),
            _ => None,
        }
    }
}

/// Deterministic structural metadata for one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceFeatures {
    /// Length in characters.
    pub char_length: usize,
    /// Whitespace-delimited token count.
    pub token_length: usize,
    /// Clause-trigger occurrences, floored at 1: a sentence with no
    /// trigger words still counts as one clause.
    pub clause_count: u32,
    pub clause_order: ClauseOrder,
    /// Subsequence of punctuation characters in original order.
    pub punctuation_pattern: String,
}

impl SentenceFeatures {
    /// Extract features from a sentence.
    pub fn extract(sentence: &str) -> Self {
        Self {
            char_length: sentence.chars().count(),
            token_length: sentence.split_whitespace().count(),
            clause_count: clause_count(sentence),
            clause_order: clause_order(sentence),
            punctuation_pattern: punctuation_pattern(sentence),
        }
    }
}

fn clause_count(sentence: &str) -> u32 {
    (CLAUSE_TRIGGER_RE.find_iter(sentence).count() as u32).max(1)
}

fn clause_order(sentence: &str) -> ClauseOrder {
    let lowered = sentence.trim().to_lowercase();
    for trigger in CLAUSE_TRIGGERS {
        if let Some(rest) = lowered.strip_prefix(trigger) {
            if rest.starts_with(' ') || rest.starts_with(',') {
                return ClauseOrder::SubordinateFirst;
            }
        }
    }
    ClauseOrder::MainFirst
}

fn punctuation_pattern(sentence: &str) -> String {
    sentence
        .chars()
        .filter(|c| PUNCTUATION_CHARS.contains(*c))
        .collect()
}

/// Character offsets of clause triggers, normalized to 0-100.
///
/// Used by the positional scorer; offsets are computed against the original
/// sentence, not the skeleton.
pub fn clause_trigger_positions(sentence: &str) -> Vec<f64> {
    let total_chars = sentence.chars().count();
    if total_chars == 0 {
        return Vec::new();
    }
    CLAUSE_TRIGGER_RE
        .find_iter(sentence)
        .map(|m| {
            let char_offset = sentence[..m.start()].chars().count();
            char_offset as f64 / total_chars as f64 * 100.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_features() {
        let f = SentenceFeatures::extract("The cat sat.");
        assert_eq!(f.char_length, 12);
        assert_eq!(f.token_length, 3);
        assert_eq!(f.clause_count, 1);
        assert_eq!(f.clause_order, ClauseOrder::MainFirst);
        assert_eq!(f.punctuation_pattern, ".");
    }

    #[test]
    fn test_clause_count_floors_at_one() {
        assert_eq!(SentenceFeatures::extract("No triggers here.").clause_count, 1);
    }

    #[test]
    fn test_clause_count_is_case_insensitive_and_word_bounded() {
        let f = SentenceFeatures::extract("When it rained, we left because it was late.");
        assert_eq!(f.clause_count, 2);
        // "butter" must not count as "but"
        let f = SentenceFeatures::extract("She spread butter on the bread.");
        assert_eq!(f.clause_count, 1);
    }

    #[test]
    fn test_subordinate_first_requires_space_or_comma() {
        let f = SentenceFeatures::extract("When it rains, it pours.");
        assert_eq!(f.clause_order, ClauseOrder::SubordinateFirst);
        let f = SentenceFeatures::extract("Whenever it rains, it pours.");
        assert_eq!(f.clause_order, ClauseOrder::MainFirst);
        let f = SentenceFeatures::extract("If, however, it rains, stay.");
        assert_eq!(f.clause_order, ClauseOrder::SubordinateFirst);
    }

    #[test]
    fn test_punctuation_pattern_preserves_order() {
        let f = SentenceFeatures::extract("Wait - really?! (Yes, really.)");
        assert_eq!(f.punctuation_pattern, "-?!(,.)");
    }

    #[test]
    fn test_trigger_positions_normalized() {
        let positions = clause_trigger_positions("stay if wet");
        assert_eq!(positions.len(), 1);
        // "if" starts at char 5 of 11 chars
        assert!((positions[0] - 5.0 / 11.0 * 100.0).abs() < 1e-9);
        assert!(clause_trigger_positions("").is_empty());
    }
}
