//! Contact versioning for revision history and point-in-time restore.
//!
//! Every mutation snapshots the contact's prior field values first, so a
//! contact at version N has snapshots 1..N-1 on file. Snapshots are
//! append-only and never rewritten; restoring creates a new version whose
//! content equals an old one, it never rewinds the counter.

mod store;
mod version;

pub use store::{SnapshotStore, SqliteSnapshotStore};
pub use version::ContactSnapshot;
