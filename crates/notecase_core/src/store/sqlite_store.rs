//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist key/value entries in the `kv_entries` table.
//!
//! # Invariants
//! - Writes upsert by key and stamp `updated_at` in epoch milliseconds.
//! - With a quota, a write is rejected when the byte total of all keys and
//!   values would exceed it; the replaced entry is not counted.
//! - The connection must be migrated before construction.

use super::{KeyValueStore, StoreError, StoreResult};
use rusqlite::{params, Connection};

const KV_TABLE: &str = "kv_entries";

/// Key-value store over a migrated SQLite connection.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
    quota_bytes: Option<usize>,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        if !table_exists(conn, KV_TABLE)? {
            return Err(StoreError::MissingRequiredTable(KV_TABLE));
        }
        Ok(Self {
            conn,
            quota_bytes: None,
        })
    }

    /// Limits the total stored bytes, the way browsers cap local storage.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    fn check_quota(&self, key: &str, value: &str) -> StoreResult<()> {
        let Some(quota_bytes) = self.quota_bytes else {
            return Ok(());
        };
        let others: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_entries
             WHERE key != ?1;",
            [key],
            |row| row.get(0),
        )?;
        let requested_bytes = usize::try_from(others)
            .unwrap_or(usize::MAX)
            .saturating_add(key.len() + value.len());
        if requested_bytes > quota_bytes {
            return Err(StoreError::QuotaExceeded {
                requested_bytes,
                quota_bytes,
            });
        }
        Ok(())
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get("key")?);
        }
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_entries WHERE key = ?1;")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get("value")?));
        }
        Ok(None)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_quota(key, value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
