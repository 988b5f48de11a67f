//! Configuration loading.
//!
//! Settings come from a TOML file (default `<data-dir>/config.toml`),
//! with serde defaults so a missing or partial file still yields a
//! usable configuration. `STENCILBANK_DATA_DIR` overrides the data
//! directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::oracle::{OracleConfig, RetryPolicy};
use crate::pipeline::SchedulerConfig;

pub const DATA_DIR_ENV: &str = "STENCILBANK_DATA_DIR";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "stencilbank.sqlite";

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Database file path; defaults to `<data-dir>/stencilbank.sqlite`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub pipeline: PipelineSettings,

    #[serde(default)]
    pub chunking: ChunkingSettings,
}

/// Scheduler and retry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Pause between sections of one job.
    #[serde(default = "default_break_secs")]
    pub break_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_policy")]
    pub retry_policy: RetryPolicy,
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,
    /// Sentences dispatched to the oracle in parallel.
    #[serde(default = "default_sentence_batch_size")]
    pub sentence_batch_size: usize,
}

fn default_tick_secs() -> u64 {
    10
}

fn default_break_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_policy() -> RetryPolicy {
    RetryPolicy::Fixed { delay_ms: 5000 }
}

fn default_politeness_delay_ms() -> u64 {
    500
}

fn default_sentence_batch_size() -> usize {
    3
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            break_secs: default_break_secs(),
            max_retries: default_max_retries(),
            retry_policy: default_retry_policy(),
            politeness_delay_ms: default_politeness_delay_ms(),
            sentence_batch_size: default_sentence_batch_size(),
        }
    }
}

impl PipelineSettings {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_secs(self.tick_secs.max(1)),
            break_duration: Duration::from_secs(self.break_secs),
            max_retries: self.max_retries,
            retry_policy: self.retry_policy,
            politeness_delay: Duration::from_millis(self.politeness_delay_ms),
            sentence_batch_size: self.sentence_batch_size.max(1),
        }
    }
}

/// Document chunking tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    #[serde(default = "default_section_words")]
    pub section_words: usize,
}

fn default_section_words() -> usize {
    crate::services::DEFAULT_SECTION_WORDS
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            section_words: default_section_words(),
        }
    }
}

/// Resolve the data directory: CLI flag, then environment, then
/// `~/.local/share/stencilbank` (or `./stencilbank-data` when no home
/// directory is available).
pub fn resolve_data_dir(cli_override: Option<&Path>) -> PathBuf {
    if let Some(dir) = cli_override {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("stencilbank"),
        _ => PathBuf::from("stencilbank-data"),
    }
}

/// Load settings from `<data-dir>/config.toml`, falling back to defaults
/// when the file does not exist.
pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&raw)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    Ok(settings)
}

impl Settings {
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE))
    }
}
