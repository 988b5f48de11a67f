//! Sentence bank store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::error::Result;
use crate::models::SentenceBankEntry;
use crate::schema::sentence_bank;

use super::pool::AsyncSqlitePool;
use super::records::SentenceBankRecord;

/// Persistence operations the matching and bank-build paths consume.
///
/// `owner = None` scopes scans to the global (unowned) bank; scoped scans
/// also see the global entries. `scan_all` ignores scoping entirely and
/// exists for maintenance views, never for matching.
#[async_trait]
pub trait BankStore: Send + Sync {
    async fn append(&self, entry: &SentenceBankEntry) -> Result<()>;
    async fn append_bulk(&self, entries: &[SentenceBankEntry]) -> Result<usize>;
    async fn scan(&self, owner: Option<&str>) -> Result<Vec<SentenceBankEntry>>;
    /// Every entry across all owners.
    async fn scan_all(&self) -> Result<Vec<SentenceBankEntry>>;
    /// Duplicate-pattern check used before inserting a new skeleton.
    async fn skeleton_exists(&self, owner: Option<&str>, skeleton: &str) -> Result<bool>;
    async fn count(&self, owner: Option<&str>) -> Result<u64>;
}

/// Diesel-backed sentence bank repository.
#[derive(Clone)]
pub struct DieselBankRepository {
    pool: AsyncSqlitePool,
}

impl DieselBankRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_entry(
        conn: &mut super::pool::AsyncSqliteConnection,
        entry: &SentenceBankEntry,
    ) -> Result<usize> {
        let rows = diesel::insert_into(sentence_bank::table)
            .values((
                sentence_bank::id.eq(&entry.id),
                sentence_bank::owner.eq(entry.owner.as_deref()),
                sentence_bank::original.eq(&entry.original),
                sentence_bank::skeleton.eq(&entry.skeleton),
                sentence_bank::char_length.eq(entry.features.char_length as i32),
                sentence_bank::token_length.eq(entry.features.token_length as i32),
                sentence_bank::clause_count.eq(entry.features.clause_count as i32),
                sentence_bank::clause_order.eq(entry.features.clause_order.as_str()),
                sentence_bank::punctuation_pattern.eq(&entry.features.punctuation_pattern),
                sentence_bank::created_at.eq(entry.created_at.to_rfc3339()),
            ))
            .execute(conn)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BankStore for DieselBankRepository {
    async fn append(&self, entry: &SentenceBankEntry) -> Result<()> {
        let mut conn = self.pool.get().await?;
        Self::insert_entry(&mut conn, entry).await?;
        Ok(())
    }

    async fn append_bulk(&self, entries: &[SentenceBankEntry]) -> Result<usize> {
        let mut conn = self.pool.get().await?;
        let mut inserted = 0;
        for entry in entries {
            inserted += Self::insert_entry(&mut conn, entry).await?;
        }
        Ok(inserted)
    }

    async fn scan(&self, owner: Option<&str>) -> Result<Vec<SentenceBankEntry>> {
        let mut conn = self.pool.get().await?;
        let records: Vec<SentenceBankRecord> = match owner {
            Some(owner) => {
                sentence_bank::table
                    .filter(
                        sentence_bank::owner
                            .eq(owner)
                            .or(sentence_bank::owner.is_null()),
                    )
                    .order(sentence_bank::created_at.asc())
                    .load(&mut conn)
                    .await?
            }
            None => {
                sentence_bank::table
                    .filter(sentence_bank::owner.is_null())
                    .order(sentence_bank::created_at.asc())
                    .load(&mut conn)
                    .await?
            }
        };
        Ok(records.into_iter().map(SentenceBankEntry::from).collect())
    }

    async fn scan_all(&self) -> Result<Vec<SentenceBankEntry>> {
        let mut conn = self.pool.get().await?;
        let records: Vec<SentenceBankRecord> = sentence_bank::table
            .order(sentence_bank::created_at.asc())
            .load(&mut conn)
            .await?;
        Ok(records.into_iter().map(SentenceBankEntry::from).collect())
    }

    async fn skeleton_exists(&self, owner: Option<&str>, skeleton: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let count: i64 = match owner {
            Some(owner) => {
                sentence_bank::table
                    .filter(sentence_bank::skeleton.eq(skeleton))
                    .filter(sentence_bank::owner.eq(owner))
                    .count()
                    .get_result(&mut conn)
                    .await?
            }
            None => {
                sentence_bank::table
                    .filter(sentence_bank::skeleton.eq(skeleton))
                    .filter(sentence_bank::owner.is_null())
                    .count()
                    .get_result(&mut conn)
                    .await?
            }
        };
        Ok(count > 0)
    }

    async fn count(&self, owner: Option<&str>) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let count: i64 = match owner {
            Some(owner) => {
                sentence_bank::table
                    .filter(
                        sentence_bank::owner
                            .eq(owner)
                            .or(sentence_bank::owner.is_null()),
                    )
                    .count()
                    .get_result(&mut conn)
                    .await?
            }
            None => {
                sentence_bank::table
                    .filter(sentence_bank::owner.is_null())
                    .count()
                    .get_result(&mut conn)
                    .await?
            }
        };
        Ok(count.max(0) as u64)
    }
}
