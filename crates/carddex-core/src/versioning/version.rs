//! Snapshot types for contact revision history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Contact, ContactFields};

/// An immutable copy of a contact's field values at one version.
///
/// Keyed by `(contact_id, version)`. The snapshot for version N is taken
/// immediately before the mutation that produces version N+1, so the live
/// record's current version is never on file until it is superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    /// Unique snapshot identifier.
    pub snapshot_id: Uuid,
    /// Contact this snapshot belongs to.
    pub contact_id: String,
    /// Version number the captured values represent.
    pub version: u32,
    /// Field values at that version.
    #[serde(flatten)]
    pub fields: ContactFields,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

impl ContactSnapshot {
    /// Capture a contact's current state.
    ///
    /// The snapshot carries the contact's *current* version number; the
    /// caller bumps the live record to version + 1 afterwards.
    pub fn of(contact: &Contact) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            contact_id: contact.id.clone(),
            version: contact.version,
            fields: contact.fields.clone(),
            created_at: Utc::now(),
        }
    }
}
