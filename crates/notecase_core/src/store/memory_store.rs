//! In-memory key-value store with optional quota and availability switch.

use super::{KeyValueStore, StoreError, StoreResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Quota most browsers grant to local storage per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Single-threaded in-memory store.
///
/// Quota accounting counts `key.len() + value.len()` over all entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: Cell<bool>,
}

impl MemoryStore {
    /// Creates an unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes growing past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Toggles availability; an unavailable store fails every operation.
    pub fn set_available(&self, available: bool) {
        self.unavailable.set(!available);
    }

    /// Returns a snapshot of all stored entries.
    pub fn raw_entries(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable(
                "in-memory store disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.ensure_available()?;

        if let Some(quota_bytes) = self.quota_bytes {
            let replaced = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let requested_bytes = self.used_bytes() - replaced + key.len() + value.len();
            if requested_bytes > quota_bytes {
                return Err(StoreError::QuotaExceeded {
                    requested_bytes,
                    quota_bytes,
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.ensure_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
