//! Fingerprint similarity scoring.
//!
//! Two bounded 0-100 strategies share the metadata components but weight
//! the skeleton differently: the coarse scorer compares skeleton text
//! directly, the positional scorer decomposes it into placeholder and
//! clause-trigger positions.

use crate::models::{SentenceBankEntry, StructuralFingerprint};
use crate::text::{clause_trigger_positions, SentenceFeatures};

use super::distance::normalized_similarity;

/// Maximum score either strategy can produce.
pub const MAX_SCORE: f64 = 100.0;

/// How many leading skeleton tokens feed the function-word sequence.
const LEADING_FUNCTION_WORDS: usize = 5;

/// A named similarity strategy over structural fingerprints.
pub trait SimilarityScorer: Send + Sync {
    fn name(&self) -> &'static str;
    /// Bounded score in `[0, 100]`; higher is more similar.
    fn score(&self, input: &StructuralFingerprint, entry: &SentenceBankEntry) -> f64;
}

/// Scorer selection carried through config and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScorerKind {
    /// Weighted coarse score over skeleton text (strategy A).
    Coarse,
    /// Positional skeleton-feature score (strategy B).
    Positional,
}

impl ScorerKind {
    pub fn scorer(&self) -> Box<dyn SimilarityScorer> {
        match self {
            Self::Coarse => Box::new(CoarseScorer),
            Self::Positional => Box::new(PositionalScorer),
        }
    }
}

/// Strategy A: weighted coarse score.
///
/// Skeleton textual similarity x40, token-length closeness x15,
/// clause-count match x15, clause-order match x15, punctuation-pattern
/// similarity x15.
pub struct CoarseScorer;

impl SimilarityScorer for CoarseScorer {
    fn name(&self) -> &'static str {
        "coarse-skeleton"
    }

    fn score(&self, input: &StructuralFingerprint, entry: &SentenceBankEntry) -> f64 {
        let skeleton = normalized_similarity(&input.skeleton, &entry.skeleton);
        skeleton * 40.0 + metadata_components(&input.features, &entry.features, 15.0)
    }
}

/// Strategy B: positional skeleton-feature score.
///
/// Placeholder positions x15, clause-trigger positions x10, leading
/// function-word sequence x10, placeholder count x5, plus the shared
/// metadata components at x15 each.
pub struct PositionalScorer;

impl SimilarityScorer for PositionalScorer {
    fn name(&self) -> &'static str {
        "positional-skeleton"
    }

    fn score(&self, input: &StructuralFingerprint, entry: &SentenceBankEntry) -> f64 {
        let a = SkeletonProfile::of(&input.skeleton);
        let b = SkeletonProfile::of(&entry.skeleton);

        let placeholder_positions =
            position_similarity(&a.placeholder_positions, &b.placeholder_positions);
        let clause_positions = position_similarity(
            &clause_trigger_positions(&input.original),
            &clause_trigger_positions(&entry.original),
        );
        let function_words =
            normalized_similarity(&a.leading_function_words, &b.leading_function_words);
        let placeholder_count = count_closeness(a.placeholder_count, b.placeholder_count);

        placeholder_positions * 15.0
            + clause_positions * 10.0
            + function_words * 10.0
            + placeholder_count * 5.0
            + metadata_components(&input.features, &entry.features, 15.0)
    }
}

/// Shared metadata components (token length, clause count, clause order,
/// punctuation), each weighted by `weight`.
fn metadata_components(a: &SentenceFeatures, b: &SentenceFeatures, weight: f64) -> f64 {
    let tokens = token_closeness(a.token_length, b.token_length);
    let clauses = clause_count_closeness(a.clause_count, b.clause_count);
    let order = if a.clause_order == b.clause_order {
        1.0
    } else {
        0.0
    };
    let punctuation = normalized_similarity(&a.punctuation_pattern, &b.punctuation_pattern);
    (tokens + clauses + order + punctuation) * weight
}

/// Full credit when the token counts differ by at most 20% of the larger;
/// otherwise linear decay proportional to the difference ratio.
fn token_closeness(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    let ratio = a.abs_diff(b) as f64 / max as f64;
    if ratio <= 0.2 {
        1.0
    } else {
        (1.0 - ratio).max(0.0)
    }
}

/// Exact match gets full credit; each unit of difference costs 25% of the
/// component, floored at zero.
fn clause_count_closeness(a: u32, b: u32) -> f64 {
    (1.0 - 0.25 * a.abs_diff(b) as f64).max(0.0)
}

fn count_closeness(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    (1.0 - a.abs_diff(b) as f64 / max as f64).max(0.0)
}

/// Average positional offset scaled by the matched-count ratio.
///
/// `1.0` when both arrays are empty, `0.0` when only one is.
fn position_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let paired = a.len().min(b.len());
    let mean_abs_diff: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / paired as f64;
    (1.0 - mean_abs_diff / 100.0) * (paired as f64 / a.len().max(b.len()) as f64)
}

/// Decomposition of a skeleton string.
///
/// The bleach prompt renders content words as underscore runs, so a
/// placeholder is any token whose non-punctuation chars are underscores.
struct SkeletonProfile {
    placeholder_positions: Vec<f64>,
    placeholder_count: usize,
    leading_function_words: String,
}

impl SkeletonProfile {
    fn of(skeleton: &str) -> Self {
        let total_chars = skeleton.chars().count();
        let mut placeholder_positions = Vec::new();
        let mut leading = Vec::new();
        let mut leading_done = false;
        let mut byte_cursor = 0usize;

        for token in skeleton.split_whitespace() {
            // split_whitespace yields tokens in order, so each token is
            // found at or after the cursor.
            let token_start =
                byte_cursor + skeleton[byte_cursor..].find(token).unwrap_or(0);
            let char_offset = skeleton[..token_start].chars().count();
            byte_cursor = token_start + token.len();

            if is_placeholder(token) {
                leading_done = true;
                if total_chars > 0 {
                    placeholder_positions.push(char_offset as f64 / total_chars as f64 * 100.0);
                }
            } else if !leading_done && leading.len() < LEADING_FUNCTION_WORDS {
                leading.push(strip_punctuation(token).to_lowercase());
            }
        }

        Self {
            placeholder_count: placeholder_positions.len(),
            placeholder_positions,
            leading_function_words: leading.join(" "),
        }
    }
}

fn is_placeholder(token: &str) -> bool {
    let core = strip_punctuation(token);
    !core.is_empty() && core.chars().all(|c| c == '_')
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentenceBankEntry, StructuralFingerprint};

    fn entry(original: &str, skeleton: &str) -> SentenceBankEntry {
        SentenceBankEntry::new(original, skeleton, None)
    }

    #[test]
    fn test_identical_fingerprint_scores_max_on_coarse() {
        let e = entry("When it rains, it pours.", "When __ ____, __ ____.");
        let input = e.fingerprint();
        let score = CoarseScorer.score(&input, &e);
        assert!((score - MAX_SCORE).abs() < 1e-9);
    }

    #[test]
    fn test_identical_fingerprint_scores_max_on_positional() {
        let e = entry("When it rains, it pours.", "When __ ____, __ ____.");
        let input = e.fingerprint();
        let score = PositionalScorer.score(&input, &e);
        assert!((score - MAX_SCORE).abs() < 1e-9);
    }

    #[test]
    fn test_identical_beats_non_identical() {
        let target = entry("When it rains, it pours.", "When __ ____, __ ____.");
        let other = entry("The cat sat on the mat.", "___ ___ ___ __ ___ ___.");
        let input = target.fingerprint();
        assert!(CoarseScorer.score(&input, &target) > CoarseScorer.score(&input, &other));
    }

    #[test]
    fn test_token_closeness_grace_band() {
        assert_eq!(token_closeness(10, 10), 1.0);
        assert_eq!(token_closeness(10, 8), 1.0); // 20% of 10
        assert!((token_closeness(10, 5) - 0.5).abs() < 1e-9);
        assert_eq!(token_closeness(0, 0), 1.0);
    }

    #[test]
    fn test_clause_count_decay() {
        assert_eq!(clause_count_closeness(2, 2), 1.0);
        assert_eq!(clause_count_closeness(2, 3), 0.75);
        assert_eq!(clause_count_closeness(1, 6), 0.0);
    }

    #[test]
    fn test_position_similarity_edges() {
        assert_eq!(position_similarity(&[], &[]), 1.0);
        assert_eq!(position_similarity(&[50.0], &[]), 0.0);
        assert_eq!(position_similarity(&[50.0], &[50.0]), 1.0);
        // One matched of two: scaled by 1/2.
        let s = position_similarity(&[50.0, 80.0], &[50.0]);
        assert!((s - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_skeleton_profile_detects_placeholders() {
        let profile = SkeletonProfile::of("When the ____ ____, it ____.");
        assert_eq!(profile.placeholder_count, 3);
        assert_eq!(profile.leading_function_words, "when the");
        assert!(profile
            .placeholder_positions
            .iter()
            .all(|p| (0.0..=100.0).contains(p)));
    }

    #[test]
    fn test_scorer_kind_names() {
        assert_eq!(ScorerKind::Coarse.scorer().name(), "coarse-skeleton");
        assert_eq!(ScorerKind::Positional.scorer().name(), "positional-skeleton");
    }
}
