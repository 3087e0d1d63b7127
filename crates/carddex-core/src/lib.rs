//! carddex-core - Core library for carddex.
//!
//! This crate provides the contact record types, the free-text query
//! compiler, and the version store behind the carddex contact database.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use carddex_core::{ContactBook, ContactFields, Page, SortSpec};
//! use carddex_core::store::SqliteContactStore;
//! use carddex_core::versioning::SqliteSnapshotStore;
//!
//! let book = ContactBook::new(
//!     Arc::new(SqliteContactStore::new("contacts.db")?),
//!     Arc::new(SqliteSnapshotStore::new("snapshots.db")?),
//! );
//!
//! // Create a contact and search for it
//! let contact = book.create(ContactFields {
//!     name: Some("Ada Lovelace".into()),
//!     ..Default::default()
//! })?;
//! let results = book.search("Ada AND Lovelace", SortSpec::default(), Page::default())?;
//!
//! // Roll a bad edit back
//! let restored = book.restore_to_version(&contact.id, 1)?;
//! ```

pub mod book;
pub mod cleanup;
pub mod error;
pub mod import;
pub mod query;
pub mod settings;
pub mod store;
pub mod types;
pub mod versioning;

// Re-export commonly used types
pub use book::ContactBook;
pub use cleanup::{run_cleanup, CleanupAction, CleanupStats};
pub use error::{CarddexError, CarddexResult, ErrorCode};
pub use import::{import_csv, ColumnMapping, ImportStats};
pub use query::compile;
pub use settings::{
    DisplaySettings, DisplaySettingsUpdate, SqliteSettingsStore, DEFAULT_SETTINGS_KEY,
};
pub use store::{ContactStore, SqliteContactStore};
pub use types::{
    Condition, ConditionOp, Contact, ContactField, ContactFields, ContactPage, ContactUpdate,
    Page, Predicate, PredicateTranslator, SortField, SortOrder, SortSpec,
};
pub use versioning::{ContactSnapshot, SnapshotStore, SqliteSnapshotStore};
