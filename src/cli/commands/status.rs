//! Job status command.

use std::path::Path;

use console::style;

use crate::cli::helpers::open_context;
use crate::config::Settings;
use crate::models::{BatchJob, JobStatus, SectionStatus};
use crate::repository::JobStore;

pub async fn cmd_status(
    data_dir: &Path,
    settings: &Settings,
    job_id: Option<&str>,
) -> anyhow::Result<()> {
    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;
    let jobs = ctx.jobs();

    match job_id {
        Some(id) => show_job(&jobs, id).await,
        None => list_jobs(&jobs).await,
    }
}

async fn list_jobs(jobs: &dyn JobStore) -> anyhow::Result<()> {
    let all = jobs.get_all_jobs().await?;
    if all.is_empty() {
        println!("No jobs.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<10}  {:<10}  {:>9}  {}",
        "JOB", "KIND", "STATUS", "PROGRESS", "CREATED"
    );
    for job in all {
        println!(
            "{:<36}  {:<10}  {:<10}  {:>4}/{:<4}  {}",
            job.id,
            job.kind.as_str(),
            styled_status(&job).to_string(),
            job.resolved_sections(),
            job.total_sections,
            job.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn show_job(jobs: &dyn JobStore, id: &str) -> anyhow::Result<()> {
    let Some(job) = jobs.get_job(id).await? else {
        println!("{} No such job: {id}", style("✗").red());
        return Ok(());
    };

    println!("Job {}", style(&job.id).cyan());
    println!("  kind:    {}", job.kind.as_str());
    println!("  status:  {}", styled_status(&job));
    println!("  level:   {}", job.transform_level.as_str());
    if let Some(owner) = &job.owner {
        println!("  owner:   {owner}");
    }
    println!(
        "  progress: {} completed, {} failed, {} total",
        job.completed_sections, job.failed_sections, job.total_sections
    );
    if let Some(due) = job.next_process_time {
        println!("  next section at: {}", due.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    for section in jobs.get_sections(&job.id).await? {
        let mark = match section.status {
            SectionStatus::Completed => style("✓").green(),
            SectionStatus::Failed => style("✗").red(),
            SectionStatus::Processing => style("▶").yellow(),
            SectionStatus::Pending => style("·").dim(),
        };
        println!(
            "  {mark} [{}] {} words, {} sentences{}",
            section.index,
            section.word_count,
            section.sentence_count,
            section
                .error_message
                .as_deref()
                .map(|e| format!(" — {e}"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

fn styled_status(job: &BatchJob) -> console::StyledObject<&'static str> {
    let s = job.status.as_str();
    match job.status {
        JobStatus::Completed => style(s).green(),
        JobStatus::Failed => style(s).red(),
        JobStatus::Processing => style(s).yellow(),
        JobStatus::Pending => style(s).dim(),
    }
}
