//! Per-request async SQLite connections.
//!
//! diesel-async's SyncConnectionWrapper moves the blocking SQLite work
//! onto tokio's blocking pool. Opening a SQLite file is cheap, so this
//! "pool" hands out a fresh connection per request instead of caching
//! idle ones.

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;

/// Error type produced by every repository operation.
pub type DieselError = diesel::result::Error;

/// SQLite connection driven through the async wrapper.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

/// Connection factory shared by the repositories.
#[derive(Clone)]
pub struct AsyncSqlitePool {
    database_url: String,
}

impl AsyncSqlitePool {
    pub fn new(database_url: &str) -> Self {
        // diesel wants the bare path, not a sqlite: URL
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    pub fn from_path(db_path: &Path) -> Self {
        Self::new(&db_path.display().to_string())
    }

    /// Open a connection.
    pub async fn get(&self) -> Result<AsyncSqliteConnection, DieselError> {
        AsyncSqliteConnection::establish(&self.database_url)
            .await
            .map_err(super::util::to_diesel_error)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}
