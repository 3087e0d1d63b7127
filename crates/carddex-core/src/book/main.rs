//! Core ContactBook implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{CarddexError, CarddexResult};
use crate::query::compile;
use crate::store::ContactStore;
use crate::types::{Contact, ContactFields, ContactPage, ContactUpdate, Page, SortSpec};
use crate::versioning::{ContactSnapshot, SnapshotStore};

/// Main ContactBook struct - the composed contact database surface.
///
/// Wraps a [`ContactStore`] and a [`SnapshotStore`] and owns the
/// snapshot-then-mutate protocol: every mutation snapshots the contact's
/// current state first, then applies the change at version + 1. The
/// snapshot write is best-effort; a failure is logged and the mutation
/// proceeds, so revision history is complete in practice but not
/// transactionally guaranteed.
///
/// Designed for one mutation per request. There is no per-contact lock:
/// two concurrent mutations to the same contact can interleave so that
/// one snapshot captures already-stale data, producing a version gap or a
/// duplicate-content snapshot. Accepted limitation.
pub struct ContactBook {
    store: Arc<dyn ContactStore>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl ContactBook {
    /// Create a new ContactBook over the given stores.
    pub fn new(store: Arc<dyn ContactStore>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self { store, snapshots }
    }

    /// Create a contact at version 1.
    pub fn create(&self, fields: ContactFields) -> CarddexResult<Contact> {
        let contact = self.store.create(fields)?;
        debug!(contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    /// Get a contact by id.
    pub fn get(&self, id: &str) -> CarddexResult<Contact> {
        self.store
            .get(id)?
            .ok_or_else(|| CarddexError::contact_not_found(id))
    }

    /// Search active contacts with a free-text query.
    ///
    /// The query string is compiled to a predicate (see
    /// [`compile`](crate::query::compile)) and handed to the store's
    /// filter. An empty query matches every active contact.
    pub fn search(&self, query: &str, sort: SortSpec, page: Page) -> CarddexResult<ContactPage> {
        let predicate = compile(query);
        debug!(query, ?predicate, "search compiled");
        self.store.find(&predicate, sort, page)
    }

    /// Apply a partial update, recording the prior state first.
    ///
    /// The version increments by exactly 1. An empty update still bumps
    /// the version and takes a snapshot, matching edit semantics where
    /// saving without changes is still a save.
    pub fn update(&self, id: &str, update: &ContactUpdate) -> CarddexResult<Contact> {
        let current = self.get(id)?;
        self.snapshot_current(&current);

        let mut fields = current.fields.clone();
        update.apply_to(&mut fields);
        self.store.update(id, &fields, current.version + 1)
    }

    /// Soft-delete a contact. History is retained.
    pub fn delete(&self, id: &str) -> CarddexResult<()> {
        self.store.soft_delete(id)?;
        debug!(contact_id = %id, "contact soft-deleted");
        Ok(())
    }

    /// Re-activate a soft-deleted contact.
    pub fn restore_active(&self, id: &str) -> CarddexResult<Contact> {
        self.store.restore_active(id)
    }

    /// Revision history for a contact, newest version first.
    pub fn history(&self, id: &str) -> CarddexResult<Vec<ContactSnapshot>> {
        // Surface a proper not-found for unknown ids rather than an
        // empty history.
        self.get(id)?;
        self.snapshots.snapshots_for(id)
    }

    /// Restore a contact to the content of an earlier version.
    ///
    /// Restoring never reuses the target version number: the result is a
    /// brand-new version (current + 1) whose fields equal the target
    /// snapshot's fields. The pre-restore state is snapshotted first so
    /// it remains recoverable.
    pub fn restore_to_version(&self, id: &str, target_version: u32) -> CarddexResult<Contact> {
        let snapshot = self
            .snapshots
            .get_snapshot(id, target_version)?
            .ok_or_else(|| CarddexError::version_not_found(id, target_version))?;
        let current = self.get(id)?;

        self.snapshot_current(&current);
        let restored = self
            .store
            .update(id, &snapshot.fields, current.version + 1)?;
        debug!(
            contact_id = %id,
            target_version,
            new_version = restored.version,
            "contact restored to version"
        );
        Ok(restored)
    }

    /// Roll every active contact back to its state at `target_date`.
    ///
    /// For each active contact created on or before the date, the most
    /// recent snapshot taken at or before the date is applied as a new
    /// version. Contacts with no eligible snapshot are left untouched, as
    /// are contacts whose current fields already equal the snapshot's, so
    /// running the operation twice in a row modifies nothing the second
    /// time. Per-contact failures are logged and do not abort the batch.
    ///
    /// Returns the number of contacts actually modified.
    pub fn restore_all_to_date(&self, target_date: DateTime<Utc>) -> CarddexResult<usize> {
        let candidates = self.store.active_created_before(target_date)?;
        let mut restored = 0usize;

        for contact in candidates {
            match self.restore_one_to_date(&contact, target_date) {
                Ok(true) => restored += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(contact_id = %contact.id, error = %e, "skipping contact in bulk restore");
                }
            }
        }

        debug!(%target_date, restored, "bulk restore finished");
        Ok(restored)
    }

    fn restore_one_to_date(
        &self,
        contact: &Contact,
        target_date: DateTime<Utc>,
    ) -> CarddexResult<bool> {
        let Some(snapshot) = self.snapshots.latest_before(&contact.id, target_date)? else {
            // No recoverable state at that date; leave the contact alone.
            return Ok(false);
        };
        if snapshot.fields == contact.fields {
            return Ok(false);
        }

        self.snapshot_current(contact);
        self.store
            .update(&contact.id, &snapshot.fields, contact.version + 1)?;
        Ok(true)
    }

    /// Best-effort snapshot of a contact's current state.
    ///
    /// A failed snapshot write must not block the mutation it precedes,
    /// so the error is logged and swallowed here.
    fn snapshot_current(&self, contact: &Contact) {
        let snapshot = ContactSnapshot::of(contact);
        if let Err(e) = self.snapshots.add_snapshot(&snapshot) {
            warn!(
                contact_id = %contact.id,
                version = contact.version,
                error = %e,
                "snapshot write failed; proceeding with mutation"
            );
        }
    }
}
