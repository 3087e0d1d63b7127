//! End-to-end tests for the versioning and restore flows.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use chrono::{DateTime, Utc};

use carddex_core::store::{ContactStore, SqliteContactStore};
use carddex_core::versioning::{ContactSnapshot, SnapshotStore, SqliteSnapshotStore};
use carddex_core::{
    CarddexError, CarddexResult, Contact, ContactBook, ContactField, ContactFields, ContactPage,
    ContactUpdate, Page, Predicate, SortSpec,
};

fn book() -> (ContactBook, Arc<SqliteSnapshotStore>) {
    let snapshots = Arc::new(SqliteSnapshotStore::in_memory().unwrap());
    let book = ContactBook::new(
        Arc::new(SqliteContactStore::in_memory().unwrap()),
        snapshots.clone(),
    );
    (book, snapshots)
}

fn named(name: &str) -> ContactFields {
    ContactFields {
        name: Some(name.into()),
        ..Default::default()
    }
}

fn rename(book: &ContactBook, id: &str, name: &str) -> Contact {
    book.update(id, &ContactUpdate::new().set(ContactField::Name, name))
        .unwrap()
}

#[test]
fn restore_to_version_creates_new_version() {
    let (book, _) = book();
    let c = book.create(named("v1")).unwrap();
    for v in 2..=5 {
        rename(&book, &c.id, &format!("v{v}"));
    }

    let current = book.get(&c.id).unwrap();
    assert_eq!(current.version, 5);

    let restored = book.restore_to_version(&c.id, 2).unwrap();
    // Content comes from version 2, but the counter moves forward.
    assert_eq!(restored.fields.name.as_deref(), Some("v2"));
    assert_eq!(restored.version, 6);

    // The pre-restore state (version 5) was snapshotted, so the restore
    // itself can be undone.
    let history = book.history(&c.id).unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].version, 5);
    assert_eq!(history[0].fields.name.as_deref(), Some("v5"));
}

#[test]
fn restore_to_missing_version_changes_nothing() {
    let (book, snapshots) = book();
    let c = book.create(named("v1")).unwrap();
    rename(&book, &c.id, "v2");

    let before_count = snapshots.count_all().unwrap();
    let err = book.restore_to_version(&c.id, 7).unwrap_err();
    assert!(matches!(err, CarddexError::VersionNotFound { version: 7, .. }));

    // Contact and snapshot log are untouched.
    let after = book.get(&c.id).unwrap();
    assert_eq!(after.version, 2);
    assert_eq!(after.fields.name.as_deref(), Some("v2"));
    assert_eq!(snapshots.count_all().unwrap(), before_count);
}

#[test]
fn restore_missing_contact_is_not_found() {
    let (book, _) = book();
    let err = book.restore_to_version("no-such-id", 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn restore_all_to_date_rolls_back_and_counts() {
    let (book, _) = book();

    let edited = book.create(named("original")).unwrap();
    let untouched = book.create(named("stable")).unwrap();

    rename(&book, &edited.id, "changed");
    sleep(Duration::from_millis(20));
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));
    rename(&book, &edited.id, "changed again");

    // Only the edited contact has a snapshot at or before the cutoff;
    // the stable one has no snapshots at all and is left alone.
    let count = book.restore_all_to_date(cutoff).unwrap();
    assert_eq!(count, 1);

    let rolled_back = book.get(&edited.id).unwrap();
    assert_eq!(rolled_back.fields.name.as_deref(), Some("original"));
    assert_eq!(rolled_back.version, 4);

    let stable = book.get(&untouched.id).unwrap();
    assert_eq!(stable.version, 1);
    assert_eq!(stable.fields.name.as_deref(), Some("stable"));
}

#[test]
fn restore_all_to_date_twice_is_a_noop() {
    let (book, _) = book();
    let c = book.create(named("original")).unwrap();
    rename(&book, &c.id, "changed");
    sleep(Duration::from_millis(20));
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));
    rename(&book, &c.id, "changed again");

    assert_eq!(book.restore_all_to_date(cutoff).unwrap(), 1);
    let after_first = book.get(&c.id).unwrap();

    // Second run finds the same snapshot but the content already
    // matches, so nothing is modified and nothing is counted.
    assert_eq!(book.restore_all_to_date(cutoff).unwrap(), 0);
    let after_second = book.get(&c.id).unwrap();
    assert_eq!(after_second.version, after_first.version);
    assert_eq!(after_second.fields, after_first.fields);
}

#[test]
fn restore_all_skips_contacts_created_after_date() {
    let (book, _) = book();
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));

    let c = book.create(named("newcomer")).unwrap();
    rename(&book, &c.id, "edited");

    assert_eq!(book.restore_all_to_date(cutoff).unwrap(), 0);
    assert_eq!(book.get(&c.id).unwrap().version, 2);
}

/// Snapshot store double whose writes always fail.
struct FailingSnapshotStore;

impl SnapshotStore for FailingSnapshotStore {
    fn add_snapshot(&self, _snapshot: &ContactSnapshot) -> CarddexResult<()> {
        Err(CarddexError::database("snapshot volume offline"))
    }

    fn get_snapshot(
        &self,
        _contact_id: &str,
        _version: u32,
    ) -> CarddexResult<Option<ContactSnapshot>> {
        Ok(None)
    }

    fn latest_before(
        &self,
        _contact_id: &str,
        _timestamp: DateTime<Utc>,
    ) -> CarddexResult<Option<ContactSnapshot>> {
        Ok(None)
    }

    fn snapshots_for(&self, _contact_id: &str) -> CarddexResult<Vec<ContactSnapshot>> {
        Ok(vec![])
    }

    fn count_all(&self) -> CarddexResult<usize> {
        Ok(0)
    }
}

#[test]
fn snapshot_write_failure_does_not_block_update() {
    let book = ContactBook::new(
        Arc::new(SqliteContactStore::in_memory().unwrap()),
        Arc::new(FailingSnapshotStore),
    );

    let c = book.create(named("Ada")).unwrap();
    let updated = rename(&book, &c.id, "Ada L.");

    // The mutation proceeds and the version still advances; only the
    // history entry is lost.
    assert_eq!(updated.version, 2);
    assert_eq!(updated.fields.name.as_deref(), Some("Ada L."));
    assert!(book.history(&c.id).unwrap().is_empty());
}

/// Contact store double that fails updates for one poisoned id.
struct PoisonedContactStore {
    inner: SqliteContactStore,
    poisoned_id: std::sync::Mutex<Option<String>>,
}

impl PoisonedContactStore {
    fn new() -> Self {
        Self {
            inner: SqliteContactStore::in_memory().unwrap(),
            poisoned_id: std::sync::Mutex::new(None),
        }
    }

    fn poison(&self, id: &str) {
        *self.poisoned_id.lock().unwrap() = Some(id.to_string());
    }
}

impl ContactStore for PoisonedContactStore {
    fn create(&self, fields: ContactFields) -> CarddexResult<Contact> {
        self.inner.create(fields)
    }

    fn get(&self, id: &str) -> CarddexResult<Option<Contact>> {
        self.inner.get(id)
    }

    fn update(&self, id: &str, fields: &ContactFields, version: u32) -> CarddexResult<Contact> {
        if self.poisoned_id.lock().unwrap().as_deref() == Some(id) {
            return Err(CarddexError::database("write failed"));
        }
        self.inner.update(id, fields, version)
    }

    fn find(
        &self,
        predicate: &Predicate,
        sort: SortSpec,
        page: Page,
    ) -> CarddexResult<ContactPage> {
        self.inner.find(predicate, sort, page)
    }

    fn soft_delete(&self, id: &str) -> CarddexResult<()> {
        self.inner.soft_delete(id)
    }

    fn restore_active(&self, id: &str) -> CarddexResult<Contact> {
        self.inner.restore_active(id)
    }

    fn active_created_before(&self, timestamp: DateTime<Utc>) -> CarddexResult<Vec<Contact>> {
        self.inner.active_created_before(timestamp)
    }
}

#[test]
fn bulk_restore_isolates_per_contact_failures() {
    let store = Arc::new(PoisonedContactStore::new());
    let book = ContactBook::new(
        store.clone(),
        Arc::new(SqliteSnapshotStore::in_memory().unwrap()),
    );

    let healthy = book.create(named("healthy")).unwrap();
    let doomed = book.create(named("doomed")).unwrap();
    rename(&book, &healthy.id, "healthy edited");
    book.update(
        &doomed.id,
        &ContactUpdate::new().set(ContactField::Name, "doomed edited"),
    )
    .unwrap();

    sleep(Duration::from_millis(20));
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));
    rename(&book, &healthy.id, "healthy edited twice");
    book.update(
        &doomed.id,
        &ContactUpdate::new().set(ContactField::Name, "doomed edited twice"),
    )
    .unwrap();

    store.poison(&doomed.id);

    // The doomed contact's restore fails, but the batch continues and
    // only successful restores are counted.
    let count = book.restore_all_to_date(cutoff).unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        book.get(&healthy.id).unwrap().fields.name.as_deref(),
        Some("healthy")
    );
    assert_eq!(
        book.get(&doomed.id).unwrap().fields.name.as_deref(),
        Some("doomed edited twice")
    );
}

#[test]
fn on_disk_stores_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let contacts_path = dir.path().join("contacts.db");
    let snapshots_path = dir.path().join("snapshots.db");

    let id = {
        let book = ContactBook::new(
            Arc::new(SqliteContactStore::new(&contacts_path).unwrap()),
            Arc::new(SqliteSnapshotStore::new(&snapshots_path).unwrap()),
        );
        let c = book.create(named("persisted")).unwrap();
        rename(&book, &c.id, "persisted v2");
        c.id
    };

    let reopened = ContactBook::new(
        Arc::new(SqliteContactStore::new(&contacts_path).unwrap()),
        Arc::new(SqliteSnapshotStore::new(&snapshots_path).unwrap()),
    );
    let c = reopened.get(&id).unwrap();
    assert_eq!(c.version, 2);
    assert_eq!(reopened.history(&id).unwrap().len(), 1);

    let restored = reopened.restore_to_version(&id, 1).unwrap();
    assert_eq!(restored.fields.name.as_deref(), Some("persisted"));
    assert_eq!(restored.version, 3);
}
