//! Retry policies for oracle calls.
//!
//! The section pipeline uses a fixed delay between attempts; other oracle
//! consumers historically used exponential backoff, so both are named,
//! configurable policies.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::OracleError;

/// Delay schedule applied between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RetryPolicy {
    /// The same delay after every failed attempt.
    Fixed { delay_ms: u64 },
    /// `initial * multiplier^(attempt-1)`, capped at `max_ms`.
    Exponential {
        initial_ms: u64,
        multiplier: f64,
        max_ms: u64,
    },
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed {
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            Self::Exponential {
                initial_ms,
                multiplier,
                max_ms,
            } => {
                let exp = multiplier.powi(attempt.saturating_sub(1) as i32);
                let ms = (*initial_ms as f64 * exp).min(*max_ms as f64);
                Duration::from_millis(ms as u64)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Fixed { delay_ms: 5000 }
    }
}

/// Run an oracle operation with up to `max_attempts` tries.
///
/// Transient failures sleep per policy and retry; fatal failures return
/// immediately. The final error is returned after exhaustion.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, OracleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, "transient oracle failure: {err}");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
