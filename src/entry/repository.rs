//! Entry repository backed by SQLite.

use crate::db::DbPool;
use crate::{Result, VaultError};

use super::listing::{ListQuery, ParentFilter, PAGE_SIZE};
use super::types::{Entry, NewEntry};

const ENTRY_COLUMNS: &str =
    "id, owner_id, name, entry_type, is_public, parent_id, content_id, created_at";

/// Repository for entry metadata.
pub struct EntryRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> EntryRepository<'a> {
    /// Create a new EntryRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new entry and return the stored record.
    pub async fn create(&self, entry: &NewEntry) -> Result<Entry> {
        let result = sqlx::query(
            "INSERT INTO entries (owner_id, name, entry_type, is_public, parent_id, content_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.owner_id)
        .bind(&entry.name)
        .bind(entry.entry_type.as_str())
        .bind(entry.is_public)
        .bind(entry.parent_id)
        .bind(&entry.content_id)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("entry".to_string()))
    }

    /// Get an entry by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entry)
    }

    /// Get an entry by ID only if it belongs to `owner_id`.
    pub async fn get_owned(&self, id: i64, owner_id: i64) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entry)
    }

    /// List one page of an owner's entries in insertion order.
    pub async fn list_by_owner(&self, owner_id: i64, query: &ListQuery) -> Result<Vec<Entry>> {
        let parent_clause = match query.parent {
            ParentFilter::Any => "",
            ParentFilter::Root => " AND parent_id IS NULL",
            ParentFilter::Folder(_) => " AND parent_id = ?",
            ParentFilter::Unmatched => return Ok(Vec::new()),
        };

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE owner_id = ?{parent_clause}
             ORDER BY id LIMIT ? OFFSET ?"
        );

        let mut q = sqlx::query_as::<_, Entry>(&sql).bind(owner_id);
        if let ParentFilter::Folder(parent_id) = query.parent {
            q = q.bind(parent_id);
        }

        let entries = q
            .bind(i64::from(PAGE_SIZE))
            .bind(query.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(entries)
    }

    /// Set the public flag of an owned entry.
    ///
    /// Returns `None` when the entry does not exist or is owned by someone else.
    pub async fn set_public(&self, id: i64, owner_id: i64, is_public: bool) -> Result<Option<Entry>> {
        let result = sqlx::query("UPDATE entries SET is_public = ? WHERE id = ? AND owner_id = ?")
            .bind(is_public)
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_owned(id, owner_id).await
    }

    /// Count an owner's entries.
    pub async fn count_by_owner(&self, owner_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
