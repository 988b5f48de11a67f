//! Candidate selection over the sentence bank.

use crate::models::{SentenceBankEntry, StructuralFingerprint};

use super::scorer::{CoarseScorer, ScorerKind, SimilarityScorer};

/// A bank entry paired with its similarity score.
#[derive(Debug, Clone)]
pub struct RankedMatch {
    pub entry: SentenceBankEntry,
    pub score: f64,
}

/// A named matching strategy.
///
/// The two implementations are not equivalent and must never be silently
/// substituted for one another: the cascading filter returns at most one
/// match and can return none, the weighted ranker always returns the
/// best N of a non-empty bank.
pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(&self, input: &StructuralFingerprint, bank: &[SentenceBankEntry])
        -> Vec<RankedMatch>;
}

/// Find-a-single-match strategy: hard structural filters, then argmax.
///
/// Filter A keeps entries within +/-10% of the input's char length and is
/// a hard stop when empty. Filter B requires an exact clause-count match.
/// Filter C prefers exact punctuation-pattern matches but falls back to
/// the filter-B survivors when none exist. Filter D takes the argmax of
/// the configured scorer; first-seen wins exact ties.
pub struct CascadingFilter {
    scorer: Box<dyn SimilarityScorer>,
}

impl CascadingFilter {
    /// Default configuration: coarse-skeleton scoring for the final filter.
    pub fn new() -> Self {
        Self {
            scorer: Box::new(CoarseScorer),
        }
    }

    pub fn with_scorer(kind: ScorerKind) -> Self {
        Self {
            scorer: kind.scorer(),
        }
    }
}

impl Default for CascadingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for CascadingFilter {
    fn name(&self) -> &'static str {
        "cascading-filter"
    }

    fn select(
        &self,
        input: &StructuralFingerprint,
        bank: &[SentenceBankEntry],
    ) -> Vec<RankedMatch> {
        let tolerance = input.features.char_length as f64 * 0.10;

        let length_survivors: Vec<&SentenceBankEntry> = bank
            .iter()
            .filter(|e| {
                (e.features.char_length as f64 - input.features.char_length as f64).abs()
                    <= tolerance
            })
            .collect();
        if length_survivors.is_empty() {
            return Vec::new();
        }

        let clause_survivors: Vec<&SentenceBankEntry> = length_survivors
            .into_iter()
            .filter(|e| e.features.clause_count == input.features.clause_count)
            .collect();
        if clause_survivors.is_empty() {
            return Vec::new();
        }

        let punctuation_matches: Vec<&SentenceBankEntry> = clause_survivors
            .iter()
            .copied()
            .filter(|e| e.features.punctuation_pattern == input.features.punctuation_pattern)
            .collect();
        let candidates = if punctuation_matches.is_empty() {
            clause_survivors
        } else {
            punctuation_matches
        };

        let mut best: Option<RankedMatch> = None;
        for entry in candidates {
            let score = self.scorer.score(input, entry);
            let better = best.as_ref().is_none_or(|b| score > b.score);
            if better {
                best = Some(RankedMatch {
                    entry: entry.clone(),
                    score,
                });
            }
        }
        best.into_iter().collect()
    }
}

/// Rank-the-whole-bank strategy: coarse score over every entry, top N.
///
/// Ties break toward the higher clause count (the richer pattern), then
/// first-seen order.
pub struct WeightedTopN {
    pub n: usize,
    scorer: CoarseScorer,
}

impl WeightedTopN {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            scorer: CoarseScorer,
        }
    }
}

impl Matcher for WeightedTopN {
    fn name(&self) -> &'static str {
        "weighted-top-n"
    }

    fn select(
        &self,
        input: &StructuralFingerprint,
        bank: &[SentenceBankEntry],
    ) -> Vec<RankedMatch> {
        let mut ranked: Vec<RankedMatch> = bank
            .iter()
            .map(|entry| RankedMatch {
                score: self.scorer.score(input, entry),
                entry: entry.clone(),
            })
            .collect();

        // Stable sort keeps first-seen order on full ties.
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.entry.features.clause_count.cmp(&a.entry.features.clause_count))
        });
        ranked.truncate(self.n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StructuralFingerprint;

    fn entry(original: &str, skeleton: &str) -> SentenceBankEntry {
        SentenceBankEntry::new(original, skeleton, None)
    }

    fn input(original: &str, skeleton: &str) -> StructuralFingerprint {
        StructuralFingerprint::new(original, skeleton)
    }

    #[test]
    fn test_length_filter_is_a_hard_stop() {
        // Entry is far outside +/-10% char length; clause and punctuation
        // are identical but must not matter.
        let bank = vec![entry(
            "A very considerably longer sentence than the input is.",
            "_ ____ ____ ____ ____ ____ ___ ____ ____ __.",
        )];
        let fp = input("The dog ran.", "___ ___ ___.");
        let result = CascadingFilter::new().select(&fp, &bank);
        assert!(result.is_empty());
    }

    #[test]
    fn test_clause_filter_rejects_mismatched_counts() {
        // Same length band, different clause count (two triggers vs one).
        let bank = vec![entry(
            "If it can, but it will not.",
            "If __ ___, but __ ____ ___.",
        )];
        let fp = input("The dog ran fast right now.", "___ ___ ___ ____ ____ ___.");
        assert_eq!(fp.features.clause_count, 1);
        let result = CascadingFilter::new().select(&fp, &bank);
        assert!(result.is_empty());
    }

    #[test]
    fn test_punctuation_filter_falls_back_when_no_exact_match() {
        // Both entries survive A and B; neither matches the input's
        // punctuation pattern exactly, so D still picks one of them.
        let bank = vec![
            entry("The cat sat, then", "___ ___ ___, ____"),
            entry("The dog ran; now", "___ ___ ___; ___"),
        ];
        let fp = input("The fox hid well", "___ ___ ___ ____");
        let result = CascadingFilter::new().select(&fp, &bank);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_cascade_selects_structural_twin() {
        // Spec property: cat/dog pair passes filters A and B and wins D.
        let bank = vec![entry("The cat sat.", "___ ___ ___.")];
        let fp = input("The dog ran.", "___ ___ ___.");
        let result = CascadingFilter::new().select(&fp, &bank);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entry.original, "The cat sat.");
    }

    #[test]
    fn test_top_n_orders_by_score_then_clause_count() {
        // `near` shares the input's clause structure and punctuation but
        // has an extra token and a different skeleton, so it scores below
        // the exact twin and above the structurally unrelated entry.
        let twin = entry("When it rains, it pours.", "When __ _____, __ _____.");
        let near = entry(
            "When he waves, he grins widely.",
            "When __ _____, __ _____ ______.",
        );
        let far = entry(
            "Nothing alike whatsoever here today.",
            "_______ _____ __________ ____ _____.",
        );
        let bank = vec![far.clone(), near.clone(), twin.clone()];

        let fp = twin.fingerprint();
        let ranked = WeightedTopN::new(3).select(&fp, &bank);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].entry.original, twin.original);
        assert_eq!(ranked[1].entry.original, near.original);
        assert_eq!(ranked[2].entry.original, far.original);
        assert!(ranked[0].score > ranked[1].score);
        assert!(ranked[1].score > ranked[2].score);
    }

    #[test]
    fn test_top_n_truncates() {
        let bank: Vec<SentenceBankEntry> = (0..5)
            .map(|i| entry(&format!("Sentence number {i} here."), "____ ____ _ ____."))
            .collect();
        let fp = input("Sentence number 9 here.", "____ ____ _ ____.");
        assert_eq!(WeightedTopN::new(3).select(&fp, &bank).len(), 3);
    }

    #[test]
    fn test_empty_bank_yields_nothing() {
        let fp = input("The dog ran.", "___ ___ ___.");
        assert!(CascadingFilter::new().select(&fp, &[]).is_empty());
        assert!(WeightedTopN::new(3).select(&fp, &[]).is_empty());
    }
}
