//! Contact record storage.
//!
//! [`ContactStore`] is the record-store contract the rest of the crate is
//! written against; [`SqliteContactStore`] is the bundled SQLite
//! implementation. The store owns version numbers, timestamps and the
//! soft-delete flag; callers hand it complete field sets and the version
//! they computed.

mod sqlite;

pub use sqlite::SqliteContactStore;

use chrono::{DateTime, Utc};

use crate::error::CarddexResult;
use crate::types::{Contact, ContactFields, ContactPage, Page, Predicate, SortSpec};

/// Trait for contact record storage operations.
pub trait ContactStore: Send + Sync {
    /// Create a new contact at version 1.
    fn create(&self, fields: ContactFields) -> CarddexResult<Contact>;

    /// Get a contact by id, active or not.
    fn get(&self, id: &str) -> CarddexResult<Option<Contact>>;

    /// Overwrite the mutable fields and set the version.
    ///
    /// Also bumps `updated_at`. Fails with `ContactNotFound` when the id
    /// does not exist.
    fn update(&self, id: &str, fields: &ContactFields, version: u32) -> CarddexResult<Contact>;

    /// Find active contacts matching a predicate, with sort and paging.
    fn find(&self, predicate: &Predicate, sort: SortSpec, page: Page)
        -> CarddexResult<ContactPage>;

    /// Soft-delete a contact (clears the active flag).
    fn soft_delete(&self, id: &str) -> CarddexResult<()>;

    /// Re-activate a soft-deleted contact.
    fn restore_active(&self, id: &str) -> CarddexResult<Contact>;

    /// All active contacts created at or before `timestamp`.
    fn active_created_before(&self, timestamp: DateTime<Utc>) -> CarddexResult<Vec<Contact>>;
}
