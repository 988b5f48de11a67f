//! stencil - structural sentence fingerprinting and batch rewriting.
//!
//! Fingerprints sentences by clause structure, punctuation shape and
//! length, matches them against a growing bank of patterns, and drives
//! long documents through an LLM rewrite pipeline in resumable,
//! rate-limited sections.

use stencilbank::cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "stencilbank=info"
    } else {
        "stencilbank=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
