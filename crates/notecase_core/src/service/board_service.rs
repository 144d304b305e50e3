//! Note board state controller.
//!
//! # Responsibility
//! - Own the in-memory categories, notes, selected category and the
//!   currently open note.
//! - Apply user mutations and mirror exactly the changed collection to the
//!   persistence gateway.
//!
//! # Invariants
//! - No mutation and no persistence write happens before `initialize()`.
//! - The load sequence runs once; later `initialize()` calls are no-ops.
//! - Entering the ready state mirrors the loaded collections to the store
//!   once, so defaults become durable and exports see the full state.
//! - Persistence writes are fire-and-forget: a failed write is logged and the
//!   in-memory state is kept.
//! - The open note is never persisted.

use crate::model::category::{default_selected_category, starter_categories, Category};
use crate::model::id::RecordId;
use crate::model::note::Note;
use crate::store::gateway::{Persistence, StorageKey};
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name shown for a category id that does not resolve.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// Why a category could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryDeleteError {
    /// The board has not finished loading.
    NotReady,
    NotFound(RecordId),
    /// Notes still reference the category.
    HasNotes { count: usize },
    /// At least one category must remain selectable.
    LastCategory,
}

impl Display for CategoryDeleteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "note board is not loaded yet"),
            Self::NotFound(id) => write!(f, "category not found: {id}"),
            Self::HasNotes { count } => {
                write!(f, "category still holds {count} note(s); move or delete them first")
            }
            Self::LastCategory => write!(f, "cannot delete the last category"),
        }
    }
}

impl Error for CategoryDeleteError {}

/// Explicitly constructed application state for one note board.
pub struct NoteBoard<S: KeyValueStore> {
    persistence: Persistence<S>,
    categories: Vec<Category>,
    notes: Vec<Note>,
    selected_category: Option<RecordId>,
    open_note: Option<RecordId>,
    ready: bool,
}

impl<S: KeyValueStore> NoteBoard<S> {
    /// Creates an uninitialized board; call `initialize()` before use.
    pub fn new(persistence: Persistence<S>) -> Self {
        Self {
            persistence,
            categories: Vec::new(),
            notes: Vec::new(),
            selected_category: None,
            open_note: None,
            ready: false,
        }
    }

    /// Creates a board and runs the initial load sequence.
    pub fn open(persistence: Persistence<S>) -> Self {
        let mut board = Self::new(persistence);
        board.initialize();
        board
    }

    /// Runs the load sequence once, mirrors it back and marks the board ready.
    pub fn initialize(&mut self) {
        if self.ready {
            return;
        }
        self.load_from_store();
        self.ready = true;
        self.persist_categories();
        self.persist_notes();
        self.persist_selected_category();
        info!(
            "event=board_init module=service status=ok categories={} notes={}",
            self.categories.len(),
            self.notes.len()
        );
    }

    /// Re-reads all collections from the store, e.g. after an import.
    ///
    /// Closes the open note and writes nothing. On an uninitialized board
    /// this is `initialize()`.
    pub fn reload(&mut self) {
        if !self.ready {
            self.initialize();
            return;
        }
        self.load_from_store();
        self.open_note = None;
        info!(
            "event=board_reload module=service status=ok categories={} notes={}",
            self.categories.len(),
            self.notes.len()
        );
    }

    fn load_from_store(&mut self) {
        self.categories = self
            .persistence
            .load(StorageKey::Categories, starter_categories());
        self.notes = self.persistence.load(StorageKey::Notes, Vec::new());
        let fallback = default_selected_category(&self.categories);
        self.selected_category = self
            .persistence
            .load(StorageKey::SelectedCategory, None::<RecordId>)
            .or(fallback);
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected_category(&self) -> Option<&RecordId> {
        self.selected_category.as_ref()
    }

    /// Display name for a category id, `"Unknown"` when it dangles.
    pub fn category_name(&self, id: &RecordId) -> &str {
        self.categories
            .iter()
            .find(|category| &category.id == id)
            .map_or(UNKNOWN_CATEGORY_NAME, |category| category.name.as_str())
    }

    /// Notes of the selected category in insertion order.
    pub fn visible_notes(&self) -> impl Iterator<Item = &Note> + '_ {
        let selected = self.selected_category.as_ref();
        self.notes
            .iter()
            .filter(move |note| Some(&note.category_id) == selected)
    }

    /// Appends a category; blank names are rejected with `None`.
    pub fn add_category(&mut self, name: &str) -> Option<Category> {
        if !self.ensure_ready("add_category") {
            return None;
        }
        let category = Category::new(name);
        if let Err(err) = category.validate() {
            debug!("event=category_add module=service status=skip reason={err}");
            return None;
        }

        self.categories.push(category.clone());
        self.persist_categories();
        info!(
            "event=category_add module=service status=ok category_id={}",
            category.id
        );
        Some(category)
    }

    /// Selects `id` without checking that it exists.
    pub fn select_category(&mut self, id: RecordId) {
        if !self.ensure_ready("select_category") {
            return;
        }
        debug!("event=category_select module=service status=ok category_id={id}");
        self.selected_category = Some(id);
        self.persist_selected_category();
    }

    /// Deletes an empty category.
    ///
    /// Moves the selection to the default of the remaining categories when
    /// the deleted one was selected.
    pub fn delete_category(&mut self, id: &RecordId) -> Result<Category, CategoryDeleteError> {
        if !self.ensure_ready("delete_category") {
            return Err(CategoryDeleteError::NotReady);
        }
        let position = self
            .categories
            .iter()
            .position(|category| &category.id == id)
            .ok_or_else(|| CategoryDeleteError::NotFound(id.clone()))?;
        let count = self
            .notes
            .iter()
            .filter(|note| &note.category_id == id)
            .count();
        if count > 0 {
            return Err(CategoryDeleteError::HasNotes { count });
        }
        if self.categories.len() == 1 {
            return Err(CategoryDeleteError::LastCategory);
        }

        let removed = self.categories.remove(position);
        self.persist_categories();
        if self.selected_category.as_ref() == Some(id) {
            self.selected_category = default_selected_category(&self.categories);
            self.persist_selected_category();
        }
        info!(
            "event=category_delete module=service status=ok category_id={}",
            removed.id
        );
        Ok(removed)
    }

    /// Creates a note in the selected category.
    ///
    /// Returns `None` when title or content is blank, or nothing is selected.
    pub fn create_note(&mut self, title: &str, content: &str, image: Option<String>) -> Option<Note> {
        if !self.ensure_ready("create_note") {
            return None;
        }
        let Some(category_id) = self.selected_category.clone() else {
            debug!("event=note_create module=service status=skip reason=no_selected_category");
            return None;
        };
        let note = Note::new(title, content, category_id, image);
        if let Err(err) = note.validate() {
            debug!("event=note_create module=service status=skip reason={err}");
            return None;
        }

        self.notes.push(note.clone());
        self.persist_notes();
        info!(
            "event=note_create module=service status=ok note_id={} category_id={} has_image={}",
            note.id,
            note.category_id,
            note.image.is_some()
        );
        Some(note)
    }

    /// Replaces the note with the same id in place.
    ///
    /// Unknown ids and blank title/content leave the notes unchanged.
    pub fn update_note(&mut self, note: Note) -> bool {
        if !self.ensure_ready("update_note") {
            return false;
        }
        let note = note.normalized();
        if let Err(err) = note.validate() {
            debug!(
                "event=note_update module=service status=skip note_id={} reason={err}",
                note.id
            );
            return false;
        }
        let Some(slot) = self.notes.iter_mut().find(|current| current.id == note.id) else {
            debug!(
                "event=note_update module=service status=skip note_id={} reason=not_found",
                note.id
            );
            return false;
        };

        let note_id = note.id.clone();
        *slot = note;
        self.persist_notes();
        info!("event=note_update module=service status=ok note_id={note_id}");
        true
    }

    /// Removes a note; closes it when it is the open note.
    pub fn delete_note(&mut self, id: &RecordId) -> bool {
        if !self.ensure_ready("delete_note") {
            return false;
        }
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        if self.notes.len() == before {
            debug!("event=note_delete module=service status=skip note_id={id} reason=not_found");
            return false;
        }

        if self.open_note.as_ref() == Some(id) {
            self.open_note = None;
        }
        self.persist_notes();
        info!("event=note_delete module=service status=ok note_id={id}");
        true
    }

    /// Opens the detail view of a note; unknown ids leave it unset.
    pub fn open_note(&mut self, id: &RecordId) -> Option<&Note> {
        self.open_note = self
            .notes
            .iter()
            .find(|note| &note.id == id)
            .map(|note| note.id.clone());
        self.opened_note()
    }

    pub fn close_note(&mut self) {
        self.open_note = None;
    }

    /// The note whose detail view is open, if any.
    pub fn opened_note(&self) -> Option<&Note> {
        let id = self.open_note.as_ref()?;
        self.notes.iter().find(|note| &note.id == id)
    }

    fn ensure_ready(&self, operation: &'static str) -> bool {
        if !self.ready {
            warn!("event={operation} module=service status=skip reason=not_ready");
        }
        self.ready
    }

    fn persist_categories(&self) {
        if !self
            .persistence
            .save(StorageKey::Categories, &self.categories)
        {
            warn!("event=board_persist module=service status=error key=categories");
        }
    }

    fn persist_notes(&self) {
        if !self.persistence.save(StorageKey::Notes, &self.notes) {
            warn!("event=board_persist module=service status=error key=notes");
        }
    }

    fn persist_selected_category(&self) {
        if !self
            .persistence
            .save(StorageKey::SelectedCategory, &self.selected_category)
        {
            warn!("event=board_persist module=service status=error key=selected_category");
        }
    }
}
