//! Durable key-value storage and the persistence gateway on top of it.
//!
//! # Responsibility
//! - Define the synchronous string key/value contract (`KeyValueStore`).
//! - Provide in-memory and SQLite-backed implementations.
//! - Expose the never-failing persistence gateway used by services.
//!
//! # Invariants
//! - Store implementations report failures as `StoreError`; only the gateway
//!   converts them into defaults and failure flags.
//! - Removing a missing key is not an error.

pub mod gateway;
pub mod memory_store;
pub mod sqlite_store;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a key-value backend.
#[derive(Debug)]
pub enum StoreError {
    /// Backend disabled or not reachable.
    Unavailable(String),
    /// Write would grow the store past its quota.
    QuotaExceeded {
        requested_bytes: usize,
        quota_bytes: usize,
    },
    Db(DbError),
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::QuotaExceeded {
                requested_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded: {requested_bytes} bytes requested, quota is {quota_bytes}"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl StoreError {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "storage_unavailable",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Db(err) => err.code(),
            Self::MissingRequiredTable(_) => "missing_table",
        }
    }
}

/// Synchronous string-keyed store mirroring browser local storage.
pub trait KeyValueStore {
    /// Reads the raw value stored at `key`.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes `value` at `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`; missing keys are not an error.
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}
