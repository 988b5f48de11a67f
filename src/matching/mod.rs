//! Similarity scoring and candidate ranking over the sentence bank.
//!
//! Two scorers (coarse-skeleton and positional-skeleton) and two matchers
//! (cascading-filter and weighted-top-N) live behind shared traits; they
//! are deliberately not equivalent and callers pick one by name.

mod distance;
mod ranker;
mod scorer;

pub use distance::{levenshtein, normalized_similarity};
pub use ranker::{CascadingFilter, Matcher, RankedMatch, WeightedTopN};
pub use scorer::{CoarseScorer, PositionalScorer, ScorerKind, SimilarityScorer, MAX_SCORE};
