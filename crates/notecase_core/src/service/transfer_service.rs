//! Import/export of the full-state backup document.
//!
//! # Responsibility
//! - Build the portable document from what the store currently holds.
//! - Validate an incoming document completely before restoring it.
//!
//! # Invariants
//! - Export reads through the persistence gateway, not from a live board.
//! - A document that fails validation causes no store writes.
//! - A failed store write rolls every imported key back to its prior value.
//! - Import overwrites categories and notes unconditionally; the stored
//!   selection changes only when the document carries one.

use crate::model::category::Category;
use crate::model::document::{format_export_date, PersistedDocument};
use crate::model::id::RecordId;
use crate::model::note::Note;
use crate::store::gateway::{Persistence, StorageKey};
use crate::store::KeyValueStore;
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Message prefix shown to users for rejected import files.
pub const INVALID_DOCUMENT_MESSAGE: &str = "Invalid JSON file or data format";

/// Failure of an import or export operation.
#[derive(Debug)]
pub enum TransferError {
    /// The document is not valid JSON or lacks the required shape.
    Validation(String),
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Serialize(serde_json::Error),
    /// The gateway reported a failed write for the named key.
    Storage(&'static str),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(details) => write!(f, "{INVALID_DOCUMENT_MESSAGE}: {details}"),
            Self::Read { path, source } => {
                write!(f, "Error reading file `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "Error writing file `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
            Self::Storage(key) => write!(f, "failed to store imported `{key}`"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Validation(_) | Self::Storage(_) => None,
        }
    }
}

impl TransferError {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_document",
            Self::Read { .. } => "read_failed",
            Self::Write { .. } => "write_failed",
            Self::Serialize(_) => "serialize_failed",
            Self::Storage(_) => "storage_failed",
        }
    }
}

/// Snapshots the stored state, stamped with the current time.
pub fn export_document<S: KeyValueStore>(persistence: &Persistence<S>) -> PersistedDocument {
    export_document_at(persistence, Utc::now())
}

/// Snapshots the stored state, stamped with `at`.
pub fn export_document_at<S: KeyValueStore>(
    persistence: &Persistence<S>,
    at: DateTime<Utc>,
) -> PersistedDocument {
    PersistedDocument {
        categories: persistence.load(StorageKey::Categories, Vec::<Category>::new()),
        notes: persistence.load(StorageKey::Notes, Vec::<Note>::new()),
        selected_category: persistence.load(StorageKey::SelectedCategory, None::<RecordId>),
        export_date: format_export_date(at),
    }
}

/// Renders a document as pretty-printed JSON.
pub fn render_document(document: &PersistedDocument) -> Result<String, TransferError> {
    serde_json::to_string_pretty(document).map_err(TransferError::Serialize)
}

/// Suggested backup file name for `date`: `notes-backup-YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("notes-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Writes the current stored state into `dir` and returns the file path.
pub fn write_export<S: KeyValueStore>(
    persistence: &Persistence<S>,
    dir: &Path,
) -> Result<PathBuf, TransferError> {
    let now = Utc::now();
    let document = export_document_at(persistence, now);
    let rendered = render_document(&document)?;
    let path = dir.join(export_file_name(now.date_naive()));

    std::fs::write(&path, rendered).map_err(|source| {
        error!(
            "event=export_write module=transfer status=error error_code=write_failed error={}",
            source
        );
        TransferError::Write {
            path: path.clone(),
            source,
        }
    })?;

    info!(
        "event=export_write module=transfer status=ok categories={} notes={}",
        document.categories.len(),
        document.notes.len()
    );
    Ok(path)
}

/// Validates `raw` as a backup document and restores it into the store.
pub fn import_bytes<S: KeyValueStore>(
    persistence: &Persistence<S>,
    raw: &[u8],
) -> Result<PersistedDocument, TransferError> {
    let document = match parse_document(raw) {
        Ok(document) => document,
        Err(err) => {
            warn!(
                "event=import module=transfer status=error error_code={} bytes={}",
                err.code(),
                raw.len()
            );
            return Err(err);
        }
    };

    let mut keys = vec![StorageKey::Categories, StorageKey::Notes];
    if document.selected_category.is_some() {
        keys.push(StorageKey::SelectedCategory);
    }
    let snapshot = snapshot_entries(persistence, &keys)?;

    if let Some(failed) = write_document(persistence, &document) {
        restore_entries(persistence, &snapshot);
        return Err(TransferError::Storage(document_field(failed)));
    }

    info!(
        "event=import module=transfer status=ok categories={} notes={} has_selection={}",
        document.categories.len(),
        document.notes.len(),
        document.selected_category.is_some()
    );
    Ok(document)
}

/// Reads a backup file and restores it into the store.
///
/// Suspends while the file is read; there is no cancellation.
pub async fn import_file<S: KeyValueStore>(
    persistence: &Persistence<S>,
    path: impl AsRef<Path>,
) -> Result<PersistedDocument, TransferError> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path).await.map_err(|source| {
        error!(
            "event=import_read module=transfer status=error error_code=read_failed error={}",
            source
        );
        TransferError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    import_bytes(persistence, &raw)
}

type Snapshot = Vec<(StorageKey, Option<String>)>;

/// Captures the raw values of `keys` so a failed import can be undone.
fn snapshot_entries<S: KeyValueStore>(
    persistence: &Persistence<S>,
    keys: &[StorageKey],
) -> Result<Snapshot, TransferError> {
    keys.iter()
        .map(|&key| match persistence.store().get_item(key.as_str()) {
            Ok(raw) => Ok((key, raw)),
            Err(err) => {
                error!(
                    "event=import module=transfer status=error key={} error_code={}",
                    key.as_str(),
                    err.code()
                );
                Err(TransferError::Storage(document_field(key)))
            }
        })
        .collect()
}

/// Writes the document in key order; returns the key whose write failed.
fn write_document<S: KeyValueStore>(
    persistence: &Persistence<S>,
    document: &PersistedDocument,
) -> Option<StorageKey> {
    if !persistence.save(StorageKey::Categories, &document.categories) {
        return Some(StorageKey::Categories);
    }
    if !persistence.save(StorageKey::Notes, &document.notes) {
        return Some(StorageKey::Notes);
    }
    if let Some(selected) = document.selected_category.as_ref() {
        if !persistence.save(StorageKey::SelectedCategory, selected) {
            return Some(StorageKey::SelectedCategory);
        }
    }
    None
}

/// Puts every snapshotted key back the way it was.
///
/// Keys are cleared before the old values are written so the restore never
/// needs more room than the pre-import state did.
fn restore_entries<S: KeyValueStore>(persistence: &Persistence<S>, snapshot: &Snapshot) {
    let store = persistence.store();
    let mut restored = true;
    for (key, _) in snapshot {
        if let Err(err) = store.remove_item(key.as_str()) {
            error!(
                "event=import_rollback module=transfer status=error key={} error_code={}",
                key.as_str(),
                err.code()
            );
            restored = false;
        }
    }
    for (key, before) in snapshot {
        let Some(raw) = before else {
            continue;
        };
        if let Err(err) = store.set_item(key.as_str(), raw) {
            error!(
                "event=import_rollback module=transfer status=error key={} error_code={}",
                key.as_str(),
                err.code()
            );
            restored = false;
        }
    }
    if restored {
        warn!(
            "event=import_rollback module=transfer status=ok keys={}",
            snapshot.len()
        );
    }
}

fn document_field(key: StorageKey) -> &'static str {
    match key {
        StorageKey::Categories => "categories",
        StorageKey::Notes => "notes",
        StorageKey::SelectedCategory => "selectedCategory",
    }
}

fn parse_document(raw: &[u8]) -> Result<PersistedDocument, TransferError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|err| TransferError::Validation(format!("not valid JSON ({err})")))?;

    let Some(object) = value.as_object() else {
        return Err(TransferError::Validation(
            "document must be a JSON object".to_string(),
        ));
    };
    for field in ["categories", "notes"] {
        if !object.get(field).is_some_and(Value::is_array) {
            return Err(TransferError::Validation(format!(
                "`{field}` must be an array"
            )));
        }
    }

    serde_json::from_value(value)
        .map_err(|err| TransferError::Validation(format!("malformed entry ({err})")))
}
