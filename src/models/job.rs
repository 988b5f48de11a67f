//! Batch job and section models.
//!
//! Jobs are created at submission time, mutated only by the scheduler,
//! and terminal once completed or failed. Sections move strictly forward
//! (`pending -> processing -> {completed, failed}`); the only backward
//! transition is the crash-recovery requeue of an interrupted
//! `processing` section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::oracle::TransformLevel;
use crate::text::Section;

/// What the batch pipeline does with each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Rewrite each sentence through the oracle.
    Rewrite,
    /// Bleach each sentence into a skeleton and grow the sentence bank.
    BankBuild,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::BankBuild => "bank-build",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rewrite" => Some(Self::Rewrite),
            "bank-build" => Some(Self::BankBuild),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A batch pipeline job.
///
/// Invariant: `completed_sections + failed_sections <= total_sections`.
/// `Completed` requires every section resolved with at least one success;
/// `Failed` means every section failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Owner scope applied to bank entries created by bank-build jobs.
    pub owner: Option<String>,
    pub transform_level: TransformLevel,
    pub total_sections: u32,
    pub completed_sections: u32,
    pub failed_sections: u32,
    pub current_section_index: u32,
    /// Earliest time the scheduler may process the job's next section.
    /// `None` while a section is in flight; a `processing` job with no
    /// scheduled time is treated as interrupted and recovered.
    pub next_process_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchJob {
    pub fn new(
        kind: JobKind,
        level: TransformLevel,
        owner: Option<&str>,
        total_sections: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            status: JobStatus::Pending,
            owner: owner.map(ToString::to_string),
            transform_level: level,
            total_sections,
            completed_sections: 0,
            failed_sections: 0,
            current_section_index: 0,
            next_process_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sections that have reached a terminal status.
    pub fn resolved_sections(&self) -> u32 {
        self.completed_sections + self.failed_sections
    }

    pub fn has_pending_sections(&self) -> bool {
        self.resolved_sections() < self.total_sections
    }
}

/// One sentence-aligned slice of a job's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSection {
    pub id: String,
    pub job_id: String,
    /// 0-based position; defines processing order.
    pub index: u32,
    pub input_text: String,
    pub output_text: Option<String>,
    pub status: SectionStatus,
    pub word_count: u32,
    pub sentence_count: u32,
    pub error_message: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl BatchSection {
    /// Build a pending section from a chunker section.
    pub fn from_chunk(job_id: &str, index: u32, chunk: &Section) -> Self {
        Self {
            id: chunk.id.clone(),
            job_id: job_id.to_string(),
            index,
            input_text: chunk.text.clone(),
            output_text: None,
            status: SectionStatus::Pending,
            word_count: chunk.word_count as u32,
            sentence_count: chunk.sentence_count as u32,
            error_message: None,
            processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(JobKind::from_str("bank-build"), Some(JobKind::BankBuild));
        assert!(SectionStatus::from_str("unknown").is_none());
    }

    #[test]
    fn test_new_job_starts_pending() {
        let job = BatchJob::new(JobKind::Rewrite, TransformLevel::Medium, None, 4);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.resolved_sections(), 0);
        assert!(job.has_pending_sections());
        assert!(job.next_process_time.is_none());
    }
}
