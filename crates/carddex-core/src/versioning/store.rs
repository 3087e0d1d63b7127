//! Snapshot storage layer with point-in-time query support.
//!
//! Provides SQLite-backed persistence for contact version snapshots.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{CarddexError, CarddexResult};
use crate::types::ContactFields;
use crate::versioning::ContactSnapshot;

/// Trait for contact snapshot storage operations.
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot. Fails if `(contact_id, version)` already exists.
    fn add_snapshot(&self, snapshot: &ContactSnapshot) -> CarddexResult<()>;

    /// Get the snapshot for a specific version.
    fn get_snapshot(
        &self,
        contact_id: &str,
        version: u32,
    ) -> CarddexResult<Option<ContactSnapshot>>;

    /// Most recent snapshot taken at or before `timestamp`, by version
    /// number descending.
    fn latest_before(
        &self,
        contact_id: &str,
        timestamp: DateTime<Utc>,
    ) -> CarddexResult<Option<ContactSnapshot>>;

    /// All snapshots for a contact, newest version first.
    fn snapshots_for(&self, contact_id: &str) -> CarddexResult<Vec<ContactSnapshot>>;

    /// Count snapshots across all contacts.
    fn count_all(&self) -> CarddexResult<usize>;
}

/// SQLite-backed snapshot store.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Create a new store at the given path.
    pub fn new(path: impl AsRef<Path>) -> CarddexResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> CarddexResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> CarddexResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS contact_snapshots (
                snapshot_id TEXT PRIMARY KEY,
                contact_id  TEXT NOT NULL,
                version     INTEGER NOT NULL,
                name        TEXT,
                email       TEXT,
                phone       TEXT,
                address     TEXT,
                notes       TEXT,
                created_at  TEXT NOT NULL,
                UNIQUE(contact_id, version)
            );

            -- Index for point-in-time queries
            CREATE INDEX IF NOT EXISTS idx_snapshots_contact_time
                ON contact_snapshots(contact_id, created_at);

            -- Index for latest-version lookups
            CREATE INDEX IF NOT EXISTS idx_snapshots_contact_version
                ON contact_snapshots(contact_id, version DESC);
        "#,
        )?;
        Ok(())
    }

    fn row_to_snapshot(row: &rusqlite::Row<'_>) -> CarddexResult<ContactSnapshot> {
        let snapshot_id: String = row.get(0)?;
        let contact_id: String = row.get(1)?;
        let version: u32 = row.get(2)?;
        let created_at: String = row.get(8)?;

        Ok(ContactSnapshot {
            snapshot_id: Uuid::parse_str(&snapshot_id)
                .map_err(|e| CarddexError::parse(e.to_string()))?,
            contact_id,
            version,
            fields: ContactFields {
                name: row.get(3)?,
                email: row.get(4)?,
                phone: row.get(5)?,
                address: row.get(6)?,
                notes: row.get(7)?,
            },
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| CarddexError::parse(e.to_string()))?,
        })
    }
}

const SNAPSHOT_COLUMNS: &str = "snapshot_id, contact_id, version, name, email, phone, address, notes, created_at";

impl SnapshotStore for SqliteSnapshotStore {
    fn add_snapshot(&self, snapshot: &ContactSnapshot) -> CarddexResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO contact_snapshots
               (snapshot_id, contact_id, version, name, email, phone, address, notes, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                snapshot.snapshot_id.to_string(),
                snapshot.contact_id,
                snapshot.version,
                snapshot.fields.name,
                snapshot.fields.email,
                snapshot.fields.phone,
                snapshot.fields.address,
                snapshot.fields.notes,
                snapshot.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_snapshot(
        &self,
        contact_id: &str,
        version: u32,
    ) -> CarddexResult<Option<ContactSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM contact_snapshots
             WHERE contact_id = ?1 AND version = ?2"
        ))?;

        stmt.query_row(params![contact_id, version], |row| {
            Ok(Self::row_to_snapshot(row))
        })
        .optional()?
        .transpose()
    }

    fn latest_before(
        &self,
        contact_id: &str,
        timestamp: DateTime<Utc>,
    ) -> CarddexResult<Option<ContactSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM contact_snapshots
             WHERE contact_id = ?1 AND created_at <= ?2
             ORDER BY version DESC
             LIMIT 1"
        ))?;

        stmt.query_row(params![contact_id, timestamp.to_rfc3339()], |row| {
            Ok(Self::row_to_snapshot(row))
        })
        .optional()?
        .transpose()
    }

    fn snapshots_for(&self, contact_id: &str) -> CarddexResult<Vec<ContactSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM contact_snapshots
             WHERE contact_id = ?1
             ORDER BY version DESC"
        ))?;

        let results = stmt.query_map(params![contact_id], |row| Ok(Self::row_to_snapshot(row)))?;

        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .collect()
    }

    fn count_all(&self) -> CarddexResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contact_snapshots", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}
