//! Database context for connection handling and repository access.
//!
//! Provides a unified entry point for database operations. Create one
//! context per command or service, then use it to access the bank and
//! job repositories.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::bank::DieselBankRepository;
use super::jobs::DieselJobRepository;
use super::pool::{AsyncSqlitePool, DieselError};

/// Database context that owns the connection factory and hands out
/// repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::new(&db_path);
/// ctx.init_schema().await?;
/// let count = ctx.bank().count(None).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a database URL such as
    /// `sqlite:path/to/db.sqlite` or a plain file path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a sentence bank repository.
    pub fn bank(&self) -> DieselBankRepository {
        DieselBankRepository::new(self.pool.clone())
    }

    /// Get a batch job repository.
    pub fn jobs(&self) -> DieselJobRepository {
        DieselJobRepository::new(self.pool.clone())
    }

    /// Initialize the database schema.
    ///
    /// Creates the necessary tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            -- Sentence bank: structural fingerprints available for matching
            CREATE TABLE IF NOT EXISTS sentence_bank (
                id TEXT PRIMARY KEY,
                owner TEXT,
                original TEXT NOT NULL,
                skeleton TEXT NOT NULL,
                char_length INTEGER NOT NULL,
                token_length INTEGER NOT NULL,
                clause_count INTEGER NOT NULL DEFAULT 1,
                clause_order TEXT NOT NULL DEFAULT 'main-first',
                punctuation_pattern TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sentence_bank_owner
                ON sentence_bank(owner);
            CREATE INDEX IF NOT EXISTS idx_sentence_bank_skeleton
                ON sentence_bank(skeleton);

            -- Batch jobs: one row per submitted text
            CREATE TABLE IF NOT EXISTS batch_jobs (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL DEFAULT 'rewrite',
                status TEXT NOT NULL DEFAULT 'pending',
                owner TEXT,
                transform_level TEXT NOT NULL DEFAULT 'medium',
                total_sections INTEGER NOT NULL DEFAULT 0,
                completed_sections INTEGER NOT NULL DEFAULT 0,
                failed_sections INTEGER NOT NULL DEFAULT 0,
                current_section_index INTEGER NOT NULL DEFAULT 0,
                next_process_time TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_batch_jobs_status
                ON batch_jobs(status);

            -- Batch sections: the per-chunk work items of a job
            CREATE TABLE IF NOT EXISTS batch_sections (
                id TEXT PRIMARY KEY,
                job_id TEXT NOT NULL,
                section_index INTEGER NOT NULL,
                input_text TEXT NOT NULL,
                output_text TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                word_count INTEGER NOT NULL DEFAULT 0,
                sentence_count INTEGER NOT NULL DEFAULT 0,
                error_message TEXT,
                processed_at TEXT,
                FOREIGN KEY (job_id) REFERENCES batch_jobs(id),
                UNIQUE (job_id, section_index)
            );

            CREATE INDEX IF NOT EXISTS idx_batch_sections_job
                ON batch_sections(job_id, status);
            "#,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::SentenceBankEntry;
    use crate::repository::bank::BankStore;

    #[tokio::test]
    async fn test_init_schema_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.sqlite"));
        ctx.init_schema().await.unwrap();
        // Idempotent
        ctx.init_schema().await.unwrap();

        let bank = ctx.bank();
        let entry =
            SentenceBankEntry::new("The cat sat on the mat.", "The ____ sat on the ____.", None);
        bank.append(&entry).await.unwrap();

        let entries = bank.scan(None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original, "The cat sat on the mat.");
        assert_eq!(entries[0].features.char_length, 23);

        assert!(bank
            .skeleton_exists(None, "The ____ sat on the ____.")
            .await
            .unwrap());
        assert!(!bank.skeleton_exists(None, "____ ran.").await.unwrap());
        assert_eq!(bank.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scoped_scan_includes_global_entries() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.sqlite"));
        ctx.init_schema().await.unwrap();

        let bank = ctx.bank();
        bank.append(&SentenceBankEntry::new(
            "It rained all day.",
            "It ____ all ____.",
            None,
        ))
        .await
        .unwrap();
        bank.append(&SentenceBankEntry::new(
            "Winds howled outside.",
            "____ ____ outside.",
            Some("style-a"),
        ))
        .await
        .unwrap();

        bank.append(&SentenceBankEntry::new(
            "Doors slammed shut.",
            "____ ____ shut.",
            Some("style-b"),
        ))
        .await
        .unwrap();

        assert_eq!(bank.scan(Some("style-a")).await.unwrap().len(), 2);
        assert_eq!(bank.scan(None).await.unwrap().len(), 1);
        assert_eq!(bank.scan(Some("style-b")).await.unwrap().len(), 2);
        // The unscoped maintenance view crosses every owner.
        assert_eq!(bank.scan_all().await.unwrap().len(), 3);
    }
}
