//! Repository layer for database persistence.
//!
//! All database access uses Diesel with diesel-async's SQLite wrapper.
//! The store traits (`BankStore`, `JobStore`) are the seam the pipeline
//! and matching services depend on; the Diesel repositories are the
//! production implementations.

pub mod bank;
pub mod context;
pub mod jobs;
pub mod pool;
pub mod records;
pub mod util;

pub use bank::{BankStore, DieselBankRepository};
pub use context::DbContext;
pub use jobs::{DieselJobRepository, JobStore};
pub use pool::{AsyncSqlitePool, DieselError};

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}
