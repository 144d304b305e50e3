//! Portable full-state snapshot used for export, import and backup.

use super::category::Category;
use super::id::RecordId;
use super::note::Note;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Full-state document written by export and accepted by import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub categories: Vec<Category>,
    pub notes: Vec<Note>,
    #[serde(default)]
    pub selected_category: Option<RecordId>,
    /// ISO-8601 UTC timestamp, millisecond precision.
    #[serde(default)]
    pub export_date: String,
}

/// Formats a timestamp the way `exportDate` stores it (`...T08:30:00.000Z`).
pub fn format_export_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
