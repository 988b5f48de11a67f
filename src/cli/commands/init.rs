//! Initialize command.

use std::path::Path;

use console::style;

use crate::cli::helpers::open_context;
use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(data_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let ctx = open_context(data_dir, settings)?;
    ctx.init_schema().await?;

    println!(
        "{} Initialized stencilbank in {}",
        style("✓").green(),
        data_dir.display()
    );
    println!("  Database: {}", settings.database_path(data_dir).display());

    Ok(())
}
