//! Error taxonomy for the engine.
//!
//! Oracle failures carry their own transient/fatal classification in
//! [`crate::oracle::OracleError`]; everything else either aborts the
//! operation (validation, empty bank) or is logged and retried on the
//! next scheduler pass (persistence).

use thiserror::Error;

/// Convenience result alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty input. Surfaced immediately, never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The sentence bank has no entries in the requested scope.
    #[error("sentence bank is empty; nothing to match against")]
    EmptyBank,

    /// Oracle call failed (transient or fatal, see `OracleError::is_transient`).
    #[error(transparent)]
    Oracle(#[from] crate::oracle::OracleError),

    /// Database operation failed. The affected job/section is left in its
    /// last durable state so the next scheduler tick can retry.
    #[error("database error: {0}")]
    Persistence(#[from] diesel::result::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
