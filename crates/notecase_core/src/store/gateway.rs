//! Persistence gateway over a key-value store.
//!
//! # Responsibility
//! - Serialize domain values to JSON and mirror them to named keys.
//! - Contain every storage failure at this boundary.
//!
//! # Invariants
//! - `load` is total: absent, empty, unreadable or unparsable entries yield
//!   the caller's default.
//! - `save` and `clear_all` report failure as `false`, never as an error.
//! - Log lines carry key names and error codes only, never stored values.

use super::KeyValueStore;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Keys owned by this application's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Categories,
    Notes,
    SelectedCategory,
}

impl StorageKey {
    /// Every key in the namespace, in clear order.
    pub const ALL: [StorageKey; 3] = [
        StorageKey::Categories,
        StorageKey::Notes,
        StorageKey::SelectedCategory,
    ];

    /// Raw key name in the durable store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "notes-app-categories",
            Self::Notes => "notes-app-notes",
            Self::SelectedCategory => "notes-app-selected-category",
        }
    }
}

/// Never-failing JSON gateway over a `KeyValueStore`.
pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads and parses the value at `key`, falling back to `default`.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> T {
        let raw = match self.store.get_item(key.as_str()) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(
                    "event=storage_load module=store status=default key={} reason=absent",
                    key.as_str()
                );
                return default;
            }
            Err(err) => {
                error!(
                    "event=storage_load module=store status=error key={} error_code={} error={}",
                    key.as_str(),
                    err.code(),
                    err
                );
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=store status=error key={} error_code=malformed_entry line={} column={}",
                    key.as_str(),
                    err.line(),
                    err.column()
                );
                default
            }
        }
    }

    /// Serializes `value` and writes it to `key`. Best effort, no retry.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=storage_save module=store status=error key={} error_code=serialize_failed error={}",
                    key.as_str(),
                    err
                );
                return false;
            }
        };

        match self.store.set_item(key.as_str(), &raw) {
            Ok(()) => {
                debug!(
                    "event=storage_save module=store status=ok key={} bytes={}",
                    key.as_str(),
                    raw.len()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=storage_save module=store status=error key={} error_code={} error={}",
                    key.as_str(),
                    err.code(),
                    err
                );
                false
            }
        }
    }

    /// Removes every key of the namespace. Idempotent.
    ///
    /// Keeps going after a failed removal so the remaining keys are still
    /// attempted, then reports `false`.
    pub fn clear_all(&self) -> bool {
        let mut cleared = true;
        for key in StorageKey::ALL {
            if let Err(err) = self.store.remove_item(key.as_str()) {
                error!(
                    "event=storage_clear module=store status=error key={} error_code={} error={}",
                    key.as_str(),
                    err.code(),
                    err
                );
                cleared = false;
            }
        }
        if cleared {
            debug!("event=storage_clear module=store status=ok");
        }
        cleared
    }
}
