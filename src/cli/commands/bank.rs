//! Sentence bank maintenance commands.

use std::collections::BTreeMap;
use std::path::Path;

use console::style;

use crate::cli::helpers::open_context;
use crate::config::Settings;
use crate::repository::BankStore;

pub async fn cmd_bank_stats(
    data_dir: &Path,
    settings: &Settings,
    owner: Option<&str>,
) -> anyhow::Result<()> {
    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;
    let bank = ctx.bank();

    // Unscoped stats cover the whole bank; scoped stats show what that
    // owner's matching actually sees.
    let entries = match owner {
        Some(owner) => bank.scan(Some(owner)).await?,
        None => bank.scan_all().await?,
    };
    println!("{} Sentence bank", style("≡").cyan());
    let global = bank.count(None).await?;
    match owner {
        Some(owner) => {
            println!("  visible to {owner}: {}", entries.len());
            println!("  of which global:  {global}");
        }
        None => {
            println!("  total entries: {}", entries.len());
            println!("  global entries: {global}");
        }
    }

    if entries.is_empty() {
        return Ok(());
    }

    let mut by_clause_count: BTreeMap<u32, usize> = BTreeMap::new();
    for entry in &entries {
        *by_clause_count.entry(entry.features.clause_count).or_default() += 1;
    }
    println!("  by clause count:");
    for (clauses, count) in by_clause_count {
        println!("    {clauses}: {count}");
    }

    Ok(())
}
