//! Batch job and section store.
//!
//! The scheduler is the only writer of job and section rows after
//! submission. Section resolution updates the section and its job's
//! counters in one transaction so a persistence failure leaves both in
//! their last durable state.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::error::Result;
use crate::models::{BatchJob, BatchSection, SectionStatus};
use crate::schema::{batch_jobs, batch_sections};

use super::pool::{AsyncSqlitePool, DieselError};
use super::records::{BatchJobRecord, BatchSectionRecord};

/// Persistence operations the scheduler and CLI consume.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job together with all of its sections.
    async fn create_job(&self, job: &BatchJob, sections: &[BatchSection]) -> Result<()>;

    async fn get_job(&self, id: &str) -> Result<Option<BatchJob>>;

    /// Jobs with status pending or processing, oldest first.
    async fn get_active_jobs(&self) -> Result<Vec<BatchJob>>;

    async fn get_all_jobs(&self) -> Result<Vec<BatchJob>>;

    async fn update_job(&self, job: &BatchJob) -> Result<()>;

    /// All sections of a job, in index order.
    async fn get_sections(&self, job_id: &str) -> Result<Vec<BatchSection>>;

    /// Lowest-index pending section of a job, if any.
    async fn get_next_pending_section(&self, job_id: &str) -> Result<Option<BatchSection>>;

    async fn update_section(&self, section: &BatchSection) -> Result<()>;

    /// Atomically persist a resolved section and its job's updated
    /// counters/status.
    async fn resolve_section(&self, section: &BatchSection, job: &BatchJob) -> Result<()>;

    /// Crash recovery: requeue sections stuck in `processing`. Returns
    /// the number of sections reset (the single-flight discipline means
    /// at most one).
    async fn reset_processing_sections(&self, job_id: &str) -> Result<usize>;
}

/// Diesel-backed job repository.
#[derive(Clone)]
pub struct DieselJobRepository {
    pool: AsyncSqlitePool,
}

impl DieselJobRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_job(
    conn: &mut super::pool::AsyncSqliteConnection,
    job: &BatchJob,
) -> std::result::Result<(), DieselError> {
    diesel::insert_into(batch_jobs::table)
        .values((
            batch_jobs::id.eq(&job.id),
            batch_jobs::kind.eq(job.kind.as_str()),
            batch_jobs::status.eq(job.status.as_str()),
            batch_jobs::owner.eq(job.owner.as_deref()),
            batch_jobs::transform_level.eq(job.transform_level.as_str()),
            batch_jobs::total_sections.eq(job.total_sections as i32),
            batch_jobs::completed_sections.eq(job.completed_sections as i32),
            batch_jobs::failed_sections.eq(job.failed_sections as i32),
            batch_jobs::current_section_index.eq(job.current_section_index as i32),
            batch_jobs::next_process_time.eq(job.next_process_time.map(|t| t.to_rfc3339())),
            batch_jobs::created_at.eq(job.created_at.to_rfc3339()),
            batch_jobs::updated_at.eq(job.updated_at.to_rfc3339()),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn insert_section(
    conn: &mut super::pool::AsyncSqliteConnection,
    section: &BatchSection,
) -> std::result::Result<(), DieselError> {
    diesel::insert_into(batch_sections::table)
        .values((
            batch_sections::id.eq(&section.id),
            batch_sections::job_id.eq(&section.job_id),
            batch_sections::section_index.eq(section.index as i32),
            batch_sections::input_text.eq(&section.input_text),
            batch_sections::output_text.eq(section.output_text.as_deref()),
            batch_sections::status.eq(section.status.as_str()),
            batch_sections::word_count.eq(section.word_count as i32),
            batch_sections::sentence_count.eq(section.sentence_count as i32),
            batch_sections::error_message.eq(section.error_message.as_deref()),
            batch_sections::processed_at.eq(section.processed_at.map(|t| t.to_rfc3339())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn write_job_update(
    conn: &mut super::pool::AsyncSqliteConnection,
    job: &BatchJob,
) -> std::result::Result<(), DieselError> {
    diesel::update(batch_jobs::table.find(&job.id))
        .set((
            batch_jobs::status.eq(job.status.as_str()),
            batch_jobs::completed_sections.eq(job.completed_sections as i32),
            batch_jobs::failed_sections.eq(job.failed_sections as i32),
            batch_jobs::current_section_index.eq(job.current_section_index as i32),
            batch_jobs::next_process_time.eq(job.next_process_time.map(|t| t.to_rfc3339())),
            batch_jobs::updated_at.eq(Utc::now().to_rfc3339()),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn write_section_update(
    conn: &mut super::pool::AsyncSqliteConnection,
    section: &BatchSection,
) -> std::result::Result<(), DieselError> {
    diesel::update(batch_sections::table.find(&section.id))
        .set((
            batch_sections::status.eq(section.status.as_str()),
            batch_sections::output_text.eq(section.output_text.as_deref()),
            batch_sections::error_message.eq(section.error_message.as_deref()),
            batch_sections::processed_at.eq(section.processed_at.map(|t| t.to_rfc3339())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl JobStore for DieselJobRepository {
    async fn create_job(&self, job: &BatchJob, sections: &[BatchSection]) -> Result<()> {
        let job = job.clone();
        let sections = sections.to_vec();
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, DieselError, _>(|conn| {
            Box::pin(async move {
                insert_job(conn, &job).await?;
                for section in &sections {
                    insert_section(conn, section).await?;
                }
                Ok(())
            })
        })
        .await?;
        Ok(())
    }

    async fn get_job(&self, id: &str) -> Result<Option<BatchJob>> {
        let mut conn = self.pool.get().await?;
        let record = batch_jobs::table
            .find(id)
            .first::<BatchJobRecord>(&mut conn)
            .await
            .optional()?;
        Ok(record.map(BatchJob::from))
    }

    async fn get_active_jobs(&self) -> Result<Vec<BatchJob>> {
        let mut conn = self.pool.get().await?;
        let records: Vec<BatchJobRecord> = batch_jobs::table
            .filter(
                batch_jobs::status
                    .eq("pending")
                    .or(batch_jobs::status.eq("processing")),
            )
            .order(batch_jobs::created_at.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(BatchJob::from).collect())
    }

    async fn get_all_jobs(&self) -> Result<Vec<BatchJob>> {
        let mut conn = self.pool.get().await?;
        let records: Vec<BatchJobRecord> = batch_jobs::table
            .order(batch_jobs::created_at.desc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(BatchJob::from).collect())
    }

    async fn update_job(&self, job: &BatchJob) -> Result<()> {
        let mut conn = self.pool.get().await?;
        write_job_update(&mut conn, job).await?;
        Ok(())
    }

    async fn get_sections(&self, job_id: &str) -> Result<Vec<BatchSection>> {
        let mut conn = self.pool.get().await?;
        let records: Vec<BatchSectionRecord> = batch_sections::table
            .filter(batch_sections::job_id.eq(job_id))
            .order(batch_sections::section_index.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(BatchSection::from).collect())
    }

    async fn get_next_pending_section(&self, job_id: &str) -> Result<Option<BatchSection>> {
        let mut conn = self.pool.get().await?;
        let record = batch_sections::table
            .filter(batch_sections::job_id.eq(job_id))
            .filter(batch_sections::status.eq(SectionStatus::Pending.as_str()))
            .order(batch_sections::section_index.asc())
            .first::<BatchSectionRecord>(&mut conn)
            .await
            .optional()?;
        Ok(record.map(BatchSection::from))
    }

    async fn update_section(&self, section: &BatchSection) -> Result<()> {
        let mut conn = self.pool.get().await?;
        write_section_update(&mut conn, section).await?;
        Ok(())
    }

    async fn resolve_section(&self, section: &BatchSection, job: &BatchJob) -> Result<()> {
        let section = section.clone();
        let job = job.clone();
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, DieselError, _>(|conn| {
            Box::pin(async move {
                write_section_update(conn, &section).await?;
                write_job_update(conn, &job).await?;
                Ok(())
            })
        })
        .await?;
        Ok(())
    }

    async fn reset_processing_sections(&self, job_id: &str) -> Result<usize> {
        let mut conn = self.pool.get().await?;
        let reset = diesel::update(
            batch_sections::table
                .filter(batch_sections::job_id.eq(job_id))
                .filter(batch_sections::status.eq(SectionStatus::Processing.as_str())),
        )
        .set(batch_sections::status.eq(SectionStatus::Pending.as_str()))
        .execute(&mut conn)
        .await?;
        Ok(reset)
    }
}
