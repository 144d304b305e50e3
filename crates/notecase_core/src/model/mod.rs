//! Domain model for categories, notes and the portable backup document.
//!
//! # Responsibility
//! - Define the records mirrored to the durable key-value store.
//! - Keep JSON field naming compatible with documents written by the
//!   browser edition (`categoryId`, `selectedCategory`, `exportDate`).
//!
//! # Invariants
//! - Category and note ids are unique; new ids come from `RecordId::generate`.
//! - Titles, contents and category names are stored trimmed and non-empty.

pub mod category;
pub mod document;
pub mod id;
pub mod image;
pub mod note;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for model records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelValidationError {
    BlankCategoryName,
    BlankNoteTitle,
    BlankNoteContent,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCategoryName => write!(f, "category name cannot be blank"),
            Self::BlankNoteTitle => write!(f, "note title cannot be blank"),
            Self::BlankNoteContent => write!(f, "note content cannot be blank"),
        }
    }
}

impl Error for ModelValidationError {}
