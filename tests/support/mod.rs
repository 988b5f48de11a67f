//! In-memory stores and scripted oracles shared across integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use stencilbank::models::{BatchJob, BatchSection, JobStatus, SectionStatus, SentenceBankEntry};
use stencilbank::oracle::{OracleError, RewriteOracle, TransformLevel};
use stencilbank::repository::{BankStore, JobStore};
use stencilbank::Result;

/// In-memory job store mirroring the Diesel repository's semantics.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<String, BatchJob>>,
    sections: Mutex<Vec<BatchSection>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self, id: &str) -> Option<BatchJob> {
        self.jobs.lock().unwrap().get(id).cloned()
    }

    pub fn sections_of(&self, job_id: &str) -> Vec<BatchSection> {
        let mut sections: Vec<BatchSection> = self
            .sections
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.index);
        sections
    }

    /// Overwrite a section directly, bypassing the store API. Used to
    /// fabricate pre-crash states.
    pub fn put_section(&self, section: BatchSection) {
        let mut sections = self.sections.lock().unwrap();
        if let Some(slot) = sections.iter_mut().find(|s| s.id == section.id) {
            *slot = section;
        } else {
            sections.push(section);
        }
    }

    pub fn put_job(&self, job: BatchJob) {
        self.jobs.lock().unwrap().insert(job.id.clone(), job);
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self, job: &BatchJob, sections: &[BatchSection]) -> Result<()> {
        self.jobs
            .lock()
            .unwrap()
            .insert(job.id.clone(), job.clone());
        self.sections
            .lock()
            .unwrap()
            .extend(sections.iter().cloned());
        Ok(())
    }

    async fn get_job(&self, id: &str) -> Result<Option<BatchJob>> {
        Ok(self.jobs.lock().unwrap().get(id).cloned())
    }

    async fn get_active_jobs(&self) -> Result<Vec<BatchJob>> {
        let mut active: Vec<BatchJob> = self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::Processing))
            .cloned()
            .collect();
        active.sort_by_key(|j| j.created_at);
        Ok(active)
    }

    async fn get_all_jobs(&self) -> Result<Vec<BatchJob>> {
        Ok(self.jobs.lock().unwrap().values().cloned().collect())
    }

    async fn update_job(&self, job: &BatchJob) -> Result<()> {
        self.jobs
            .lock()
            .unwrap()
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get_sections(&self, job_id: &str) -> Result<Vec<BatchSection>> {
        Ok(self.sections_of(job_id))
    }

    async fn get_next_pending_section(&self, job_id: &str) -> Result<Option<BatchSection>> {
        Ok(self
            .sections_of(job_id)
            .into_iter()
            .find(|s| s.status == SectionStatus::Pending))
    }

    async fn update_section(&self, section: &BatchSection) -> Result<()> {
        self.put_section(section.clone());
        Ok(())
    }

    async fn resolve_section(&self, section: &BatchSection, job: &BatchJob) -> Result<()> {
        self.put_section(section.clone());
        self.jobs
            .lock()
            .unwrap()
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn reset_processing_sections(&self, job_id: &str) -> Result<usize> {
        let mut sections = self.sections.lock().unwrap();
        let mut reset = 0;
        for section in sections
            .iter_mut()
            .filter(|s| s.job_id == job_id && s.status == SectionStatus::Processing)
        {
            section.status = SectionStatus::Pending;
            reset += 1;
        }
        Ok(reset)
    }
}

/// In-memory bank store with the owner-scoping rules of the Diesel one.
#[derive(Default)]
pub struct MemoryBankStore {
    entries: Mutex<Vec<SentenceBankEntry>>,
}

impl MemoryBankStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<SentenceBankEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn all(&self) -> Vec<SentenceBankEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl BankStore for MemoryBankStore {
    async fn append(&self, entry: &SentenceBankEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn append_bulk(&self, entries: &[SentenceBankEntry]) -> Result<usize> {
        self.entries.lock().unwrap().extend(entries.iter().cloned());
        Ok(entries.len())
    }

    async fn scan(&self, owner: Option<&str>) -> Result<Vec<SentenceBankEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| match owner {
                Some(owner) => {
                    e.owner.is_none() || e.owner.as_deref() == Some(owner)
                }
                None => e.owner.is_none(),
            })
            .cloned()
            .collect())
    }

    async fn scan_all(&self) -> Result<Vec<SentenceBankEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn skeleton_exists(&self, owner: Option<&str>, skeleton: &str) -> Result<bool> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.skeleton == skeleton && e.owner.as_deref() == owner))
    }

    async fn count(&self, owner: Option<&str>) -> Result<u64> {
        Ok(self.scan(owner).await?.len() as u64)
    }
}

/// Oracle whose rewrite is a deterministic transform and whose failures
/// are scripted per sentence.
pub struct ScriptedOracle {
    /// Sentences containing any of these substrings always fail.
    pub fail_on: Vec<&'static str>,
    pub calls: AtomicU32,
}

impl ScriptedOracle {
    pub fn reliable() -> Self {
        Self {
            fail_on: Vec::new(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing_on(markers: Vec<&'static str>) -> Self {
        Self {
            fail_on: markers,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, text: &str) -> Result<(), OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.iter().any(|marker| text.contains(marker)) {
            Err(OracleError::Connection("scripted failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RewriteOracle for ScriptedOracle {
    async fn rewrite(&self, text: &str, _level: TransformLevel) -> Result<String, OracleError> {
        self.check(text)?;
        Ok(format!("rewritten: {text}"))
    }

    async fn bleach(&self, text: &str) -> Result<String, OracleError> {
        self.check(text)?;
        Ok(text
            .split_whitespace()
            .map(|word| {
                let tail: String = word.chars().filter(|c| !c.is_alphanumeric()).collect();
                format!("____{tail}")
            })
            .collect::<Vec<_>>()
            .join(" "))
    }
}
