//! Schema versions of the key-value database.
//!
//! Version 1 creates `kv_entries`, the single table behind `SqliteKvStore`.
//!
//! # Invariants
//! - Versions are contiguous, starting at 1.
//! - `PRAGMA user_version` holds the last applied version and is bumped in
//!   the same transaction as the schema change.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the schema up to `latest_version()`.
///
/// Returns the `(from, to)` versions; both are equal when nothing ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<(u32, u32)> {
    let from = schema_version(conn)?;
    let latest = latest_version();

    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok((from, from));
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok((from, latest))
}

/// Reads the applied schema version (`0` for a fresh database).
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
