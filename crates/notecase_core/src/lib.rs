//! Core domain logic for Notecase.
//! This crate is the single source of truth for note board invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::category::{
    default_selected_category, starter_categories, Category, STARTER_DEFAULT_CATEGORY,
};
pub use model::document::PersistedDocument;
pub use model::id::RecordId;
pub use model::image::{encode_image_data_url, guess_image_mime, image_mime_type, ImageError};
pub use model::note::Note;
pub use model::ModelValidationError;
pub use service::board_service::{CategoryDeleteError, NoteBoard, UNKNOWN_CATEGORY_NAME};
pub use service::transfer_service::{
    export_document, export_document_at, export_file_name, import_bytes, import_file,
    render_document, write_export, TransferError,
};
pub use store::gateway::{Persistence, StorageKey};
pub use store::memory_store::{MemoryStore, DEFAULT_QUOTA_BYTES};
pub use store::sqlite_store::SqliteKvStore;
pub use store::{KeyValueStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
