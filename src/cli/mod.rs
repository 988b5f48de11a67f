//! Command-line interface.

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, resolve_data_dir};
use crate::matching::ScorerKind;
use crate::models::JobKind;
use crate::oracle::TransformLevel;

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Structural sentence fingerprinting and batch rewriting")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Submit text as a batch job
    Submit {
        /// Input file, or literal text with --text
        input: String,
        /// Treat INPUT as literal text instead of a file path
        #[arg(long)]
        text: bool,
        /// What to do with each sentence
        #[arg(short, long, value_enum, default_value = "rewrite")]
        kind: JobKind,
        /// How aggressively sentences are transformed
        #[arg(short, long, value_enum, default_value = "medium")]
        level: TransformLevel,
        /// Owner scope for bank entries created by bank-build jobs
        #[arg(short, long)]
        owner: Option<String>,
        /// Target words per section (overrides config)
        #[arg(long)]
        section_words: Option<usize>,
    },

    /// Run the scheduler until interrupted
    Run {
        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
        /// Seconds to pause between sections (overrides config)
        #[arg(long)]
        break_secs: Option<u64>,
    },

    /// Show job progress (all jobs, or one job with its sections)
    Status {
        /// Job ID
        job_id: Option<String>,
    },

    /// Match a sentence against the bank
    Match {
        /// Sentence to match
        sentence: String,
        /// Rank the whole bank and show the top N instead of the single best
        #[arg(short, long)]
        top: Option<usize>,
        /// Scorer for the single-best cascade
        #[arg(short, long, value_enum, default_value = "coarse")]
        scorer: ScorerKind,
        /// Restrict matching to this owner's entries plus global ones
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Sentence bank maintenance
    Bank {
        #[command(subcommand)]
        command: BankCommands,
    },

    /// Check that the rewrite oracle is reachable
    Check,
}

#[derive(Subcommand)]
enum BankCommands {
    /// Show bank entry counts and structure breakdown
    Stats {
        /// Count entries visible to this owner
        #[arg(short, long)]
        owner: Option<String>,
    },
    /// Submit text as a bank-build job (shorthand for submit --kind bank-build)
    Ingest {
        /// Input file, or literal text with --text
        input: String,
        /// Treat INPUT as literal text instead of a file path
        #[arg(long)]
        text: bool,
        /// Owner scope for the new entries
        #[arg(short, long)]
        owner: Option<String>,
        /// Target words per section (overrides config)
        #[arg(long)]
        section_words: Option<usize>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let settings = load_settings(&data_dir)?;

    match cli.command {
        Commands::Init => commands::cmd_init(&data_dir, &settings).await,
        Commands::Submit {
            input,
            text,
            kind,
            level,
            owner,
            section_words,
        } => {
            commands::cmd_submit(
                &data_dir,
                &settings,
                &input,
                text,
                kind,
                level,
                owner,
                section_words,
            )
            .await
        }
        Commands::Run { once, break_secs } => {
            commands::cmd_run(&data_dir, &settings, once, break_secs).await
        }
        Commands::Status { job_id } => {
            commands::cmd_status(&data_dir, &settings, job_id.as_deref()).await
        }
        Commands::Match {
            sentence,
            top,
            scorer,
            owner,
        } => {
            commands::cmd_match(
                &data_dir,
                &settings,
                &sentence,
                top,
                scorer,
                owner.as_deref(),
            )
            .await
        }
        Commands::Bank { command } => match command {
            BankCommands::Stats { owner } => {
                commands::cmd_bank_stats(&data_dir, &settings, owner.as_deref()).await
            }
            BankCommands::Ingest {
                input,
                text,
                owner,
                section_words,
            } => {
                commands::cmd_submit(
                    &data_dir,
                    &settings,
                    &input,
                    text,
                    JobKind::BankBuild,
                    TransformLevel::Medium,
                    owner,
                    section_words,
                )
                .await
            }
        },
        Commands::Check => commands::cmd_check(&settings).await,
    }
}
