//! Text submission: chunk a document and persist it as a batch job.

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{BatchJob, BatchSection, JobKind};
use crate::oracle::TransformLevel;
use crate::repository::JobStore;
use crate::text::chunk_text;

/// Defaults sized so a section's oracle traffic stays well under typical
/// model context limits.
pub const DEFAULT_SECTION_WORDS: usize = 300;

/// Caller-supplied knobs for a submission.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub kind: JobKind,
    pub level: TransformLevel,
    pub owner: Option<String>,
    pub section_words: usize,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            kind: JobKind::Rewrite,
            level: TransformLevel::Medium,
            owner: None,
            section_words: DEFAULT_SECTION_WORDS,
        }
    }
}

/// Chunk `text` into sections and persist a pending job for the
/// scheduler to pick up. Returns the created job.
pub async fn submit_text(
    jobs: &dyn JobStore,
    text: &str,
    options: &SubmitOptions,
) -> Result<BatchJob> {
    if text.trim().is_empty() {
        return Err(Error::Validation("submitted text is empty".into()));
    }
    if options.section_words == 0 {
        return Err(Error::Validation("section size must be positive".into()));
    }

    let chunks = chunk_text(text, options.section_words);
    if chunks.is_empty() {
        return Err(Error::Validation("submitted text has no sentences".into()));
    }

    let job = BatchJob::new(
        options.kind,
        options.level,
        options.owner.as_deref(),
        chunks.len() as u32,
    );
    let sections: Vec<BatchSection> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| BatchSection::from_chunk(&job.id, index as u32, chunk))
        .collect();

    jobs.create_job(&job, &sections).await?;
    info!(
        job_id = %job.id,
        kind = job.kind.as_str(),
        sections = job.total_sections,
        "job submitted"
    );
    Ok(job)
}
