//! Per-section transformation.
//!
//! A section's text is segmented into sentences and each sentence goes
//! through the rewrite oracle. Sentences are dispatched in small parallel
//! batches with a politeness delay between batches; results are
//! reassembled in original sentence order. One failed sentence never
//! aborts the section: after retry exhaustion it is replaced by a visible
//! failure marker and processing continues.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{BatchJob, JobKind, SentenceBankEntry};
use crate::oracle::{with_retries, RetryPolicy, RewriteOracle};
use crate::repository::BankStore;
use crate::text::segment_sentences;

/// Substituted for a sentence whose oracle calls were exhausted.
pub const FAILURE_MARKER: &str = "[REWRITE FAILED]";

/// Knobs for sentence dispatch within one section.
#[derive(Debug, Clone)]
pub struct SectionPipelineConfig {
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    /// Delay between sentence batches.
    pub politeness_delay: std::time::Duration,
    /// Sentences dispatched to the oracle in parallel.
    pub sentence_batch_size: usize,
}

impl Default for SectionPipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_policy: RetryPolicy::default(),
            politeness_delay: std::time::Duration::from_millis(500),
            sentence_batch_size: 3,
        }
    }
}

/// Result of running one section through the pipeline.
#[derive(Debug, Clone)]
pub struct SectionOutcome {
    pub output: String,
    pub total_sentences: usize,
    pub failed_sentences: usize,
}

impl SectionOutcome {
    /// A section fails only when every one of its sentences failed.
    pub fn all_failed(&self) -> bool {
        self.total_sentences > 0 && self.failed_sentences == self.total_sentences
    }
}

/// Per-sentence record emitted by bank-build sections.
#[derive(Debug, Clone, Serialize)]
struct BankBuildRecord {
    sentence: String,
    skeleton: Option<String>,
    status: &'static str,
}

/// Runs a section's sentences through the oracle.
pub struct SectionPipeline {
    oracle: Arc<dyn RewriteOracle>,
    bank: Arc<dyn BankStore>,
    config: SectionPipelineConfig,
}

impl SectionPipeline {
    pub fn new(
        oracle: Arc<dyn RewriteOracle>,
        bank: Arc<dyn BankStore>,
        config: SectionPipelineConfig,
    ) -> Self {
        Self {
            oracle,
            bank,
            config,
        }
    }

    /// Transform one section according to the job's kind.
    pub async fn run(&self, job: &BatchJob, input_text: &str) -> Result<SectionOutcome> {
        let sentences = segment_sentences(input_text);
        if sentences.is_empty() {
            return Err(Error::Validation("section contains no sentences".into()));
        }

        match job.kind {
            JobKind::Rewrite => self.rewrite_section(job, &sentences).await,
            JobKind::BankBuild => self.build_bank_section(job, &sentences).await,
        }
    }

    async fn rewrite_section(
        &self,
        job: &BatchJob,
        sentences: &[String],
    ) -> Result<SectionOutcome> {
        let results = self
            .oracle_fan_out(sentences, |sentence| {
                let oracle = Arc::clone(&self.oracle);
                let level = job.transform_level;
                async move { oracle.rewrite(&sentence, level).await }
            })
            .await;

        let failed = results.iter().filter(|r| r.is_none()).count();
        let output = results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| FAILURE_MARKER.to_string()))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(SectionOutcome {
            output,
            total_sentences: sentences.len(),
            failed_sentences: failed,
        })
    }

    async fn build_bank_section(
        &self,
        job: &BatchJob,
        sentences: &[String],
    ) -> Result<SectionOutcome> {
        let skeletons = self
            .oracle_fan_out(sentences, |sentence| {
                let oracle = Arc::clone(&self.oracle);
                async move { oracle.bleach(&sentence).await }
            })
            .await;

        // Dedup checks and inserts run sequentially so two identical
        // skeletons in one section cannot both pass the existence check.
        let mut records = Vec::with_capacity(sentences.len());
        let mut failed = 0usize;
        for (sentence, skeleton) in sentences.iter().zip(skeletons) {
            let record = match skeleton {
                Some(skeleton) => {
                    if self
                        .bank
                        .skeleton_exists(job.owner.as_deref(), &skeleton)
                        .await?
                    {
                        debug!(skeleton, "skipping duplicate skeleton");
                        BankBuildRecord {
                            sentence: sentence.clone(),
                            skeleton: Some(skeleton),
                            status: "duplicate",
                        }
                    } else {
                        let entry =
                            SentenceBankEntry::new(sentence, &skeleton, job.owner.as_deref());
                        self.bank.append(&entry).await?;
                        BankBuildRecord {
                            sentence: sentence.clone(),
                            skeleton: Some(skeleton),
                            status: "added",
                        }
                    }
                }
                None => {
                    failed += 1;
                    BankBuildRecord {
                        sentence: sentence.clone(),
                        skeleton: None,
                        status: "failed",
                    }
                }
            };
            records.push(record);
        }

        let output = serde_json::to_string(&records)
            .map_err(|e| Error::Validation(format!("failed to encode bank records: {e}")))?;

        Ok(SectionOutcome {
            output,
            total_sentences: sentences.len(),
            failed_sentences: failed,
        })
    }

    /// Dispatch sentences to the oracle in parallel batches, preserving
    /// input order. `None` marks a sentence whose retries were exhausted.
    async fn oracle_fan_out<F, Fut>(&self, sentences: &[String], call: F) -> Vec<Option<String>>
    where
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = Result<String, crate::oracle::OracleError>>,
    {
        let batch_size = self.config.sentence_batch_size.max(1);
        let mut results = Vec::with_capacity(sentences.len());

        for (batch_index, batch) in sentences.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.config.politeness_delay).await;
            }

            let futures = batch.iter().map(|sentence| {
                let sentence = sentence.clone();
                let call = &call;
                async move {
                    with_retries(&self.config.retry_policy, self.config.max_retries, || {
                        call(sentence.clone())
                    })
                    .await
                }
            });

            for (sentence, result) in batch.iter().zip(join_all(futures).await) {
                match result {
                    Ok(text) => results.push(Some(text)),
                    Err(err) => {
                        warn!(sentence, "sentence failed after retries: {err}");
                        results.push(None);
                    }
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::BatchJob;
    use crate::oracle::{OracleError, TransformLevel};

    struct UppercaseOracle;

    #[async_trait]
    impl RewriteOracle for UppercaseOracle {
        async fn rewrite(&self, text: &str, _level: TransformLevel) -> Result<String, OracleError> {
            Ok(text.to_uppercase())
        }

        async fn bleach(&self, text: &str) -> Result<String, OracleError> {
            Ok(text
                .split_whitespace()
                .map(|_| "____")
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    /// Fails every call for sentences containing the given marker word.
    struct SelectiveOracle {
        poison: &'static str,
        calls: AtomicU32,
    }

    #[async_trait]
    impl RewriteOracle for SelectiveOracle {
        async fn rewrite(&self, text: &str, _level: TransformLevel) -> Result<String, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains(self.poison) {
                Err(OracleError::Connection("refused".into()))
            } else {
                Ok(text.to_string())
            }
        }

        async fn bleach(&self, text: &str) -> Result<String, OracleError> {
            self.rewrite(text, TransformLevel::Light).await
        }
    }

    struct NullBank;

    #[async_trait]
    impl BankStore for NullBank {
        async fn append(&self, _entry: &SentenceBankEntry) -> Result<()> {
            Ok(())
        }
        async fn append_bulk(&self, entries: &[SentenceBankEntry]) -> Result<usize> {
            Ok(entries.len())
        }
        async fn scan(&self, _owner: Option<&str>) -> Result<Vec<SentenceBankEntry>> {
            Ok(Vec::new())
        }
        async fn scan_all(&self) -> Result<Vec<SentenceBankEntry>> {
            Ok(Vec::new())
        }
        async fn skeleton_exists(&self, _owner: Option<&str>, _skeleton: &str) -> Result<bool> {
            Ok(false)
        }
        async fn count(&self, _owner: Option<&str>) -> Result<u64> {
            Ok(0)
        }
    }

    fn fast_config() -> SectionPipelineConfig {
        SectionPipelineConfig {
            max_retries: 3,
            retry_policy: RetryPolicy::Fixed { delay_ms: 0 },
            politeness_delay: std::time::Duration::ZERO,
            sentence_batch_size: 3,
        }
    }

    #[tokio::test]
    async fn test_rewrite_preserves_sentence_order() {
        let pipeline = SectionPipeline::new(
            Arc::new(UppercaseOracle),
            Arc::new(NullBank),
            fast_config(),
        );
        let job = BatchJob::new(JobKind::Rewrite, TransformLevel::Medium, None, 1);
        let outcome = pipeline
            .run(&job, "A cat sat. It was calm! Was it happy?")
            .await
            .unwrap();
        assert_eq!(outcome.output, "A CAT SAT. IT WAS CALM! WAS IT HAPPY?");
        assert_eq!(outcome.total_sentences, 3);
        assert_eq!(outcome.failed_sentences, 0);
        assert!(!outcome.all_failed());
    }

    #[tokio::test]
    async fn test_failed_sentence_gets_marker_and_section_continues() {
        let oracle = Arc::new(SelectiveOracle {
            poison: "storm",
            calls: AtomicU32::new(0),
        });
        let pipeline = SectionPipeline::new(oracle.clone(), Arc::new(NullBank), fast_config());
        let job = BatchJob::new(JobKind::Rewrite, TransformLevel::Light, None, 1);
        let outcome = pipeline
            .run(&job, "The sun rose. The storm came. Birds sang.")
            .await
            .unwrap();
        assert_eq!(
            outcome.output,
            format!("The sun rose. {FAILURE_MARKER} Birds sang.")
        );
        assert_eq!(outcome.failed_sentences, 1);
        assert!(!outcome.all_failed());
        // Two clean sentences at one call each, poisoned sentence retried 3 times.
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_all_sentences_failing_marks_section_failed() {
        let oracle = Arc::new(SelectiveOracle {
            poison: "e",
            calls: AtomicU32::new(0),
        });
        let pipeline = SectionPipeline::new(oracle, Arc::new(NullBank), fast_config());
        let job = BatchJob::new(JobKind::Rewrite, TransformLevel::Heavy, None, 1);
        let outcome = pipeline.run(&job, "The rain fell. Winds were high.").await.unwrap();
        assert_eq!(outcome.failed_sentences, 2);
        assert!(outcome.all_failed());
    }

    #[tokio::test]
    async fn test_empty_section_is_a_validation_error() {
        let pipeline = SectionPipeline::new(
            Arc::new(UppercaseOracle),
            Arc::new(NullBank),
            fast_config(),
        );
        let job = BatchJob::new(JobKind::Rewrite, TransformLevel::Medium, None, 1);
        assert!(matches!(
            pipeline.run(&job, "   ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bank_build_emits_structured_records() {
        let pipeline = SectionPipeline::new(
            Arc::new(UppercaseOracle),
            Arc::new(NullBank),
            fast_config(),
        );
        let job = BatchJob::new(JobKind::BankBuild, TransformLevel::Medium, None, 1);
        let outcome = pipeline.run(&job, "The cat sat. The dog ran.").await.unwrap();
        let records: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["status"], "added");
        assert_eq!(records[0]["skeleton"], "____ ____ ____");
    }
}
