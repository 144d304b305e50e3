//! Note record.

use super::id::RecordId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// User-authored note with an optional image payload.
///
/// `image` holds either a `data:` URL or a remote URL; it is written as
/// `null` when absent and may be missing entirely in older documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub category_id: RecordId,
    #[serde(default)]
    pub image: Option<String>,
}

impl Note {
    /// Creates a note with a freshly minted id and trimmed text fields.
    pub fn new(title: &str, content: &str, category_id: RecordId, image: Option<String>) -> Self {
        Self {
            id: RecordId::generate(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            category_id,
            image,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::BlankNoteTitle);
        }
        if self.content.trim().is_empty() {
            return Err(ModelValidationError::BlankNoteContent);
        }
        Ok(())
    }

    /// Returns a copy with title and content trimmed.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_serializes_with_camel_case_category_id_and_null_image() {
        let note = Note::new("Plan", "Draft plan", RecordId::Number(4), None);
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["categoryId"], 4);
        assert!(value["image"].is_null());
    }

    #[test]
    fn missing_image_field_reads_as_none() {
        let note: Note =
            serde_json::from_str(r#"{"id":2,"title":"t","content":"c","categoryId":1}"#).unwrap();
        assert_eq!(note.image, None);
        assert_eq!(note.category_id, RecordId::Number(1));
    }

    #[test]
    fn validate_rejects_blank_title_or_content() {
        let blank_title = Note::new(" ", "x", RecordId::Number(1), None);
        assert_eq!(
            blank_title.validate(),
            Err(ModelValidationError::BlankNoteTitle)
        );
        let blank_content = Note::new("x", "\n", RecordId::Number(1), None);
        assert_eq!(
            blank_content.validate(),
            Err(ModelValidationError::BlankNoteContent)
        );
    }
}
