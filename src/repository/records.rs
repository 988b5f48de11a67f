//! Diesel ORM records for database tables.
//!
//! Records are the raw row shapes; `From` impls convert them into domain
//! models, falling back to safe defaults on unparseable enum strings.

use diesel::prelude::*;

use crate::models::{
    BatchJob, BatchSection, JobKind, JobStatus, SectionStatus, SentenceBankEntry,
};
use crate::oracle::TransformLevel;
use crate::schema;
use crate::text::{ClauseOrder, SentenceFeatures};

use super::{parse_datetime, parse_datetime_opt};

/// Sentence bank row.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::sentence_bank)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SentenceBankRecord {
    pub id: String,
    pub owner: Option<String>,
    pub original: String,
    pub skeleton: String,
    pub char_length: i32,
    pub token_length: i32,
    pub clause_count: i32,
    pub clause_order: String,
    pub punctuation_pattern: String,
    pub created_at: String,
}

impl From<SentenceBankRecord> for SentenceBankEntry {
    fn from(record: SentenceBankRecord) -> Self {
        SentenceBankEntry {
            id: record.id,
            owner: record.owner,
            original: record.original,
            skeleton: record.skeleton,
            features: SentenceFeatures {
                char_length: record.char_length.max(0) as usize,
                token_length: record.token_length.max(0) as usize,
                clause_count: record.clause_count.max(1) as u32,
                clause_order: ClauseOrder::from_str(&record.clause_order)
                    .unwrap_or(ClauseOrder::MainFirst),
                punctuation_pattern: record.punctuation_pattern,
            },
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Batch job row.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::batch_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BatchJobRecord {
    pub id: String,
    pub kind: String,
    pub status: String,
    pub owner: Option<String>,
    pub transform_level: String,
    pub total_sections: i32,
    pub completed_sections: i32,
    pub failed_sections: i32,
    pub current_section_index: i32,
    pub next_process_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BatchJobRecord> for BatchJob {
    fn from(record: BatchJobRecord) -> Self {
        BatchJob {
            id: record.id,
            kind: JobKind::from_str(&record.kind).unwrap_or(JobKind::Rewrite),
            status: JobStatus::from_str(&record.status).unwrap_or(JobStatus::Pending),
            owner: record.owner,
            transform_level: TransformLevel::from_str(&record.transform_level)
                .unwrap_or(TransformLevel::Medium),
            total_sections: record.total_sections.max(0) as u32,
            completed_sections: record.completed_sections.max(0) as u32,
            failed_sections: record.failed_sections.max(0) as u32,
            current_section_index: record.current_section_index.max(0) as u32,
            next_process_time: parse_datetime_opt(record.next_process_time),
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Batch section row.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::batch_sections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BatchSectionRecord {
    pub id: String,
    pub job_id: String,
    pub section_index: i32,
    pub input_text: String,
    pub output_text: Option<String>,
    pub status: String,
    pub word_count: i32,
    pub sentence_count: i32,
    pub error_message: Option<String>,
    pub processed_at: Option<String>,
}

impl From<BatchSectionRecord> for BatchSection {
    fn from(record: BatchSectionRecord) -> Self {
        BatchSection {
            id: record.id,
            job_id: record.job_id,
            index: record.section_index.max(0) as u32,
            input_text: record.input_text,
            output_text: record.output_text,
            status: SectionStatus::from_str(&record.status).unwrap_or(SectionStatus::Pending),
            word_count: record.word_count.max(0) as u32,
            sentence_count: record.sentence_count.max(0) as u32,
            error_message: record.error_message,
            processed_at: parse_datetime_opt(record.processed_at),
        }
    }
}
