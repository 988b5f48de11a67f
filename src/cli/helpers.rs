//! Shared command plumbing.

use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::oracle::{OllamaOracle, RewriteOracle};
use crate::repository::DbContext;

/// Open the database context, creating the data directory if needed.
pub fn open_context(data_dir: &Path, settings: &Settings) -> anyhow::Result<DbContext> {
    std::fs::create_dir_all(data_dir)?;
    Ok(DbContext::new(&settings.database_path(data_dir)))
}

pub fn build_oracle(settings: &Settings) -> anyhow::Result<Arc<dyn RewriteOracle>> {
    let oracle = OllamaOracle::new(settings.oracle.clone())?;
    Ok(Arc::new(oracle))
}
