//! Submit command.

use std::path::Path;

use console::style;

use crate::cli::helpers::open_context;
use crate::config::Settings;
use crate::models::JobKind;
use crate::oracle::TransformLevel;
use crate::services::{submit_text, SubmitOptions};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_submit(
    data_dir: &Path,
    settings: &Settings,
    input: &str,
    literal: bool,
    kind: JobKind,
    level: TransformLevel,
    owner: Option<String>,
    section_words: Option<usize>,
) -> anyhow::Result<()> {
    let text = if literal {
        input.to_string()
    } else {
        std::fs::read_to_string(input)?
    };

    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;

    let options = SubmitOptions {
        kind,
        level,
        owner,
        section_words: section_words.unwrap_or(settings.chunking.section_words),
    };
    let job = submit_text(&ctx.jobs(), &text, &options).await?;

    println!(
        "{} Submitted {} job {}",
        style("✓").green(),
        job.kind.as_str(),
        style(&job.id).cyan()
    );
    println!(
        "  {} sections, level {}",
        job.total_sections,
        job.transform_level.as_str()
    );
    println!("  Start the scheduler with: stencil run");

    Ok(())
}
