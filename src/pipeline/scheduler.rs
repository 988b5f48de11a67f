//! Batch scheduler.
//!
//! A single, non-reentrant loop drives active jobs one section per tick.
//! The busy lock guarantees at most one section is in flight at any
//! instant, which also means sections within a job resolve strictly in
//! index order. Between sections a job is parked until
//! `next_process_time` to throttle oracle usage.
//!
//! Crash recovery: the busy lock means a due job can never have a
//! section legitimately in flight, so any section still marked
//! `processing` when its job comes up for work was interrupted. Every
//! due pass resets such sections to `pending` before claiming, and the
//! claim clears the job's scheduled time before touching the section,
//! so a crash at any point leaves a state the next tick requeues.
//! Completed sections are never revisited.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::{BatchJob, BatchSection, JobStatus, SectionStatus};
use crate::oracle::{RetryPolicy, RewriteOracle};
use crate::repository::{BankStore, JobStore};

use super::clock::Clock;
use super::section::{SectionPipeline, SectionPipelineConfig};

/// Scheduler tuning. Defaults follow the production pipeline: 10s ticks,
/// a 60s break between sections, 3 oracle attempts per sentence with a
/// fixed 5s delay, 500ms politeness delay between sentence batches of 3.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub break_duration: Duration,
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    pub politeness_delay: Duration,
    pub sentence_batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            break_duration: Duration::from_secs(60),
            max_retries: 3,
            retry_policy: RetryPolicy::default(),
            politeness_delay: Duration::from_millis(500),
            sentence_batch_size: 3,
        }
    }
}

impl SchedulerConfig {
    fn section_config(&self) -> SectionPipelineConfig {
        SectionPipelineConfig {
            max_retries: self.max_retries,
            retry_policy: self.retry_policy,
            politeness_delay: self.politeness_delay,
            sentence_batch_size: self.sentence_batch_size,
        }
    }
}

/// What a single tick accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A previous tick still holds the busy lock.
    Busy,
    /// No job was due for work.
    Idle,
    /// One section was processed and its job parked for the next break.
    SectionProcessed,
    /// A job ran out of pending sections and reached a terminal status.
    JobFinalized,
}

/// Drives active jobs through the section pipeline.
pub struct Scheduler {
    jobs: Arc<dyn JobStore>,
    bank: Arc<dyn BankStore>,
    oracle: Arc<dyn RewriteOracle>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    busy: tokio::sync::Mutex<()>,
}

impl Scheduler {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        bank: Arc<dyn BankStore>,
        oracle: Arc<dyn RewriteOracle>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            jobs,
            bank,
            oracle,
            clock,
            config,
            busy: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one scheduler pass: at most one unit of work.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let Ok(_guard) = self.busy.try_lock() else {
            return Ok(TickOutcome::Busy);
        };

        let now = self.clock.now();
        for mut job in self.jobs.get_active_jobs().await? {
            match job.status {
                JobStatus::Pending => {
                    job.status = JobStatus::Processing;
                    self.jobs.update_job(&job).await?;
                }
                JobStatus::Processing => {
                    if let Some(due) = job.next_process_time {
                        if due > now {
                            continue;
                        }
                    }
                    // Nothing can be legitimately in flight on a due job, so
                    // a `processing` section here was interrupted; requeue it.
                    let reset = self.jobs.reset_processing_sections(&job.id).await?;
                    if reset > 0 {
                        warn!(job_id = %job.id, reset, "recovered interrupted section");
                    }
                }
                _ => continue,
            }

            let Some(section) = self.jobs.get_next_pending_section(&job.id).await? else {
                return self.finalize_job(job).await;
            };

            return self.process_section(job, section).await;
        }

        Ok(TickOutcome::Idle)
    }

    async fn process_section(
        &self,
        mut job: BatchJob,
        mut section: BatchSection,
    ) -> Result<TickOutcome> {
        // Claim. The job's scheduled time is cleared before the section is
        // marked, so a crash between the two writes leaves either a pending
        // section or a due job with a `processing` section; the recovery
        // sweep requeues both.
        job.current_section_index = section.index;
        job.next_process_time = None;
        self.jobs.update_job(&job).await?;
        section.status = SectionStatus::Processing;
        self.jobs.update_section(&section).await?;

        info!(
            job_id = %job.id,
            section = section.index,
            of = job.total_sections,
            "processing section"
        );

        let pipeline = SectionPipeline::new(
            Arc::clone(&self.oracle),
            Arc::clone(&self.bank),
            self.config.section_config(),
        );

        match pipeline.run(&job, &section.input_text).await {
            Ok(outcome) if !outcome.all_failed() => {
                if outcome.failed_sentences > 0 {
                    warn!(
                        job_id = %job.id,
                        section = section.index,
                        failed = outcome.failed_sentences,
                        total = outcome.total_sentences,
                        "section completed with failed sentences"
                    );
                }
                section.status = SectionStatus::Completed;
                section.output_text = Some(outcome.output);
                section.error_message = None;
                job.completed_sections += 1;
            }
            Ok(outcome) => {
                section.status = SectionStatus::Failed;
                section.error_message = Some(format!(
                    "all {} sentences failed",
                    outcome.total_sentences
                ));
                job.failed_sections += 1;
            }
            Err(err) => {
                error!(job_id = %job.id, section = section.index, "section failed: {err}");
                section.status = SectionStatus::Failed;
                section.error_message = Some(err.to_string());
                job.failed_sections += 1;
            }
        }
        section.processed_at = Some(self.clock.now());

        if job.has_pending_sections() {
            job.next_process_time =
                Some(self.clock.now() + ChronoDuration::from_std(self.config.break_duration)
                    .unwrap_or_else(|_| ChronoDuration::seconds(60)));
            self.jobs.resolve_section(&section, &job).await?;
            Ok(TickOutcome::SectionProcessed)
        } else {
            job.status = finalized_status(&job);
            job.next_process_time = None;
            self.jobs.resolve_section(&section, &job).await?;
            info!(job_id = %job.id, status = job.status.as_str(), "job finalized");
            Ok(TickOutcome::JobFinalized)
        }
    }

    async fn finalize_job(&self, mut job: BatchJob) -> Result<TickOutcome> {
        job.status = finalized_status(&job);
        job.next_process_time = None;
        self.jobs.update_job(&job).await?;
        info!(job_id = %job.id, status = job.status.as_str(), "job finalized");
        Ok(TickOutcome::JobFinalized)
    }

    /// Run the tick loop until shutdown is signalled.
    ///
    /// Persistence errors are logged and the loop keeps going; the
    /// affected job stays in its last durable state and is retried on a
    /// later tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(
            tick = ?self.config.tick_interval,
            break_duration = ?self.config.break_duration,
            "scheduler started"
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.tick().await {
                        error!("scheduler tick failed: {err}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler stopping");
                        break;
                    }
                }
            }
        }
    }
}

/// A job fails only when every section failed.
fn finalized_status(job: &BatchJob) -> JobStatus {
    if job.total_sections > 0 && job.failed_sections == job.total_sections {
        JobStatus::Failed
    } else {
        JobStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobKind;
    use crate::oracle::TransformLevel;

    #[test]
    fn test_finalized_status_requires_total_failure() {
        let mut job = BatchJob::new(JobKind::Rewrite, TransformLevel::Medium, None, 3);
        job.completed_sections = 2;
        job.failed_sections = 1;
        assert_eq!(finalized_status(&job), JobStatus::Completed);

        job.completed_sections = 0;
        job.failed_sections = 3;
        assert_eq!(finalized_status(&job), JobStatus::Failed);
    }
}
