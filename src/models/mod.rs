//! Domain models for stencilbank.

mod bank;
mod job;

pub use bank::{SentenceBankEntry, StructuralFingerprint};
pub use job::{BatchJob, BatchSection, JobKind, JobStatus, SectionStatus};
