//! Sentence matching against the bank.
//!
//! Builds a fingerprint for the input sentence (features from the
//! original text, skeleton from the oracle) and runs the chosen matching
//! strategy over the visible slice of the bank.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::matching::{CascadingFilter, Matcher, RankedMatch, ScorerKind, WeightedTopN};
use crate::models::StructuralFingerprint;
use crate::oracle::RewriteOracle;
use crate::repository::BankStore;

/// Matching operations over the sentence bank.
pub struct MatchService {
    bank: Arc<dyn BankStore>,
    oracle: Arc<dyn RewriteOracle>,
}

impl MatchService {
    pub fn new(bank: Arc<dyn BankStore>, oracle: Arc<dyn RewriteOracle>) -> Self {
        Self { bank, oracle }
    }

    /// Single-best match via the cascading filter. `None` means no bank
    /// entry survived the structural filters.
    pub async fn find_best(
        &self,
        sentence: &str,
        owner: Option<&str>,
        scorer: ScorerKind,
    ) -> Result<Option<RankedMatch>> {
        let (fingerprint, bank) = self.prepare(sentence, owner).await?;
        let matcher = CascadingFilter::with_scorer(scorer);
        debug!(strategy = matcher.name(), candidates = bank.len(), "matching");
        Ok(matcher.select(&fingerprint, &bank).into_iter().next())
    }

    /// Top-N ranking of the whole visible bank.
    pub async fn top_n(
        &self,
        sentence: &str,
        owner: Option<&str>,
        n: usize,
    ) -> Result<Vec<RankedMatch>> {
        let (fingerprint, bank) = self.prepare(sentence, owner).await?;
        let matcher = WeightedTopN::new(n);
        debug!(strategy = matcher.name(), candidates = bank.len(), "ranking");
        Ok(matcher.select(&fingerprint, &bank))
    }

    /// Validate input, load the visible bank slice, and fingerprint the
    /// sentence. The bank is checked before the oracle call so an empty
    /// bank fails fast without network traffic.
    async fn prepare(
        &self,
        sentence: &str,
        owner: Option<&str>,
    ) -> Result<(StructuralFingerprint, Vec<crate::models::SentenceBankEntry>)> {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            return Err(Error::Validation("input sentence is empty".into()));
        }

        let bank = self.bank.scan(owner).await?;
        if bank.is_empty() {
            return Err(Error::EmptyBank);
        }

        let skeleton = self.oracle.bleach(sentence).await?;
        Ok((StructuralFingerprint::new(sentence, skeleton), bank))
    }
}
