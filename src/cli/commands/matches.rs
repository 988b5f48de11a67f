//! Sentence matching command.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::cli::helpers::{build_oracle, open_context};
use crate::config::Settings;
use crate::matching::ScorerKind;
use crate::services::MatchService;

pub async fn cmd_match(
    data_dir: &Path,
    settings: &Settings,
    sentence: &str,
    top: Option<usize>,
    scorer: ScorerKind,
    owner: Option<&str>,
) -> anyhow::Result<()> {
    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;

    let service = MatchService::new(Arc::new(ctx.bank()), build_oracle(settings)?);

    match top {
        Some(n) => {
            let ranked = service.top_n(sentence, owner, n).await?;
            for (rank, m) in ranked.iter().enumerate() {
                println!(
                    "{:>2}. {:>6.1}  {}",
                    rank + 1,
                    m.score,
                    m.entry.original
                );
                println!("    {}", style(&m.entry.skeleton).dim());
            }
        }
        None => match service.find_best(sentence, owner, scorer).await? {
            Some(m) => {
                println!("{} score {:.1}", style("✓").green(), m.score);
                println!("  {}", m.entry.original);
                println!("  {}", style(&m.entry.skeleton).dim());
            }
            None => {
                println!(
                    "{} No bank entry survived the structural filters",
                    style("✗").yellow()
                );
            }
        },
    }

    Ok(())
}
