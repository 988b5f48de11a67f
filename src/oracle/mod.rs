//! The external rewrite oracle.
//!
//! The oracle is the only fallible, non-deterministic dependency in the
//! engine: an LLM call mapping `(text, level) -> text`. Callers own
//! retry, backoff, and timeout policy.

mod client;
mod retry;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{OllamaOracle, OracleConfig};
pub use retry::{with_retries, RetryPolicy};

/// How aggressively a sentence is transformed. Validated once at the
/// boundary and carried as a typed value internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransformLevel {
    Light,
    Medium,
    Heavy,
}

impl TransformLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "medium" => Some(Self::Medium),
            "heavy" => Some(Self::Heavy),
            _ => None,
        }
    }
}

/// Errors from oracle calls.
///
/// Transient errors are retried per policy; fatal ones go straight to the
/// failure-marker path.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Malformed or unusable oracle response.
    #[error("unusable response: {0}")]
    Response(String),
}

impl OracleError {
    /// Whether the retry policy applies. Rate limits, overload, timeouts
    /// and connection failures are transient; malformed responses and
    /// other client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Response(_) => false,
        }
    }
}

/// The external rewrite dependency, treated as opaque.
///
/// Non-idempotent: repeated calls with identical input are not guaranteed
/// to return identical output.
#[async_trait]
pub trait RewriteOracle: Send + Sync {
    /// Rewrite a sentence at the given transform level.
    async fn rewrite(&self, text: &str, level: TransformLevel) -> Result<String, OracleError>;

    /// Render a sentence's structural skeleton: content words replaced by
    /// placeholders, function words, punctuation and word order preserved.
    async fn bleach(&self, text: &str) -> Result<String, OracleError>;
}
