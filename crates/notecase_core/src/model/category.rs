//! Category record and the built-in starter set.

use super::id::RecordId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Id of the category selected when nothing is stored yet (Work).
pub const STARTER_DEFAULT_CATEGORY: RecordId = RecordId::Number(4);

/// Named grouping that notes belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
}

impl Category {
    /// Creates a category with a freshly minted id and a trimmed name.
    ///
    /// Does not validate; call `validate()` before persisting.
    pub fn new(name: &str) -> Self {
        Self::with_id(RecordId::generate(), name)
    }

    /// Creates a category with a caller-provided id.
    pub fn with_id(id: RecordId, name: &str) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankCategoryName);
        }
        Ok(())
    }
}

/// Categories used when the store holds none.
pub fn starter_categories() -> Vec<Category> {
    [(1, "Life"), (2, "School"), (3, "Friends"), (4, "Work")]
        .into_iter()
        .map(|(id, name)| Category::with_id(RecordId::Number(id), name))
        .collect()
}

/// Picks the selection used when none is stored.
///
/// Prefers the starter default (Work) when it is present, otherwise the
/// first category. Returns `None` only for an empty list.
pub fn default_selected_category(categories: &[Category]) -> Option<RecordId> {
    categories
        .iter()
        .find(|category| category.id == STARTER_DEFAULT_CATEGORY)
        .or_else(|| categories.first())
        .map(|category| category.id.clone())
}
