//! Sentence bank entries and ephemeral fingerprints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::SentenceFeatures;

/// Ephemeral structural fingerprint, computed per input sentence at
/// match time. Never persisted on its own.
///
/// Features are derived from `original`; `skeleton` is the oracle's
/// structural rendering of the same sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralFingerprint {
    pub original: String,
    pub skeleton: String,
    pub features: SentenceFeatures,
}

impl StructuralFingerprint {
    /// Build a fingerprint from a sentence and its oracle-rendered skeleton.
    pub fn new(original: impl Into<String>, skeleton: impl Into<String>) -> Self {
        let original = original.into();
        let features = SentenceFeatures::extract(&original);
        Self {
            original,
            skeleton: skeleton.into(),
            features,
        }
    }
}

/// A persisted structural pattern. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceBankEntry {
    pub id: String,
    /// Optional owner/author scope; `None` entries are globally visible.
    pub owner: Option<String>,
    pub original: String,
    pub skeleton: String,
    pub features: SentenceFeatures,
    pub created_at: DateTime<Utc>,
}

impl SentenceBankEntry {
    /// Create a new bank entry, extracting features from the original
    /// sentence.
    pub fn new(original: &str, skeleton: &str, owner: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.map(ToString::to_string),
            original: original.to_string(),
            skeleton: skeleton.to_string(),
            features: SentenceFeatures::extract(original),
            created_at: Utc::now(),
        }
    }

    /// Entry viewed as a fingerprint for scoring.
    pub fn fingerprint(&self) -> StructuralFingerprint {
        StructuralFingerprint {
            original: self.original.clone(),
            skeleton: self.skeleton.clone(),
            features: self.features.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ClauseOrder;

    #[test]
    fn test_fingerprint_features_come_from_original() {
        // Skeleton deliberately has different punctuation and length.
        let fp = StructuralFingerprint::new("When it rains, it pours.", "____ __ ____ __ ____");
        assert_eq!(fp.features.clause_order, ClauseOrder::SubordinateFirst);
        assert_eq!(fp.features.punctuation_pattern, ",.");
        assert_eq!(fp.features.char_length, 24);
    }

    #[test]
    fn test_entry_scope() {
        let entry = SentenceBankEntry::new("The cat sat.", "___ ___ ___.", Some("alice"));
        assert_eq!(entry.owner.as_deref(), Some("alice"));
        assert_eq!(entry.features.clause_count, 1);
    }
}
