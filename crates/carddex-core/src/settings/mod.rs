//! Display settings as a keyed singleton.
//!
//! One settings row per key (the default key is `"default"`), created
//! with default values on first access. No ambient global state: callers
//! go through [`SqliteSettingsStore`] and get explicit
//! load-or-initialize semantics.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

use crate::error::CarddexResult;
use crate::types::{SortField, SortOrder};

/// Key of the shared default settings row.
pub const DEFAULT_SETTINGS_KEY: &str = "default";

/// Per-key display preferences for contact listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_name: bool,
    pub show_email: bool,
    pub show_phone: bool,
    pub show_address: bool,
    pub show_notes: bool,
    pub items_per_page: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub terse_display: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_name: true,
            show_email: true,
            show_phone: true,
            show_address: true,
            show_notes: false,
            items_per_page: 20,
            sort_by: SortField::Name,
            sort_order: SortOrder::Asc,
            terse_display: false,
        }
    }
}

/// Typed partial update for display settings.
///
/// Only these fields can change; there is no runtime key filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySettingsUpdate {
    pub show_name: Option<bool>,
    pub show_email: Option<bool>,
    pub show_phone: Option<bool>,
    pub show_address: Option<bool>,
    pub show_notes: Option<bool>,
    pub items_per_page: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub terse_display: Option<bool>,
}

impl DisplaySettingsUpdate {
    /// Apply this update on top of existing settings.
    pub fn apply_to(&self, settings: &mut DisplaySettings) {
        if let Some(v) = self.show_name {
            settings.show_name = v;
        }
        if let Some(v) = self.show_email {
            settings.show_email = v;
        }
        if let Some(v) = self.show_phone {
            settings.show_phone = v;
        }
        if let Some(v) = self.show_address {
            settings.show_address = v;
        }
        if let Some(v) = self.show_notes {
            settings.show_notes = v;
        }
        if let Some(v) = self.items_per_page {
            settings.items_per_page = v;
        }
        if let Some(v) = self.sort_by {
            settings.sort_by = v;
        }
        if let Some(v) = self.sort_order {
            settings.sort_order = v;
        }
        if let Some(v) = self.terse_display {
            settings.terse_display = v;
        }
    }
}

/// SQLite-backed settings store.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
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
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS display_settings (
                settings_key TEXT PRIMARY KEY,
                settings     TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(())
    }

    fn read(&self, key: &str) -> CarddexResult<Option<DisplaySettings>> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row(
                "SELECT settings FROM display_settings WHERE settings_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, settings: &DisplaySettings) -> CarddexResult<()> {
        let json = serde_json::to_string(settings)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO display_settings (settings_key, settings)
               VALUES (?1, ?2)
               ON CONFLICT(settings_key) DO UPDATE SET settings = excluded.settings"#,
            params![key, json],
        )?;
        Ok(())
    }

    /// Load settings for a key, creating the default row on first access.
    pub fn load_or_init(&self, key: &str) -> CarddexResult<DisplaySettings> {
        if let Some(existing) = self.read(key)? {
            return Ok(existing);
        }
        let defaults = DisplaySettings::default();
        self.write(key, &defaults)?;
        Ok(defaults)
    }

    /// Apply a partial update, initializing the row first if needed.
    pub fn update(
        &self,
        key: &str,
        update: &DisplaySettingsUpdate,
    ) -> CarddexResult<DisplaySettings> {
        let mut settings = self.load_or_init(key)?;
        update.apply_to(&mut settings);
        self.write(key, &settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_init_creates_defaults_once() {
        let store = SqliteSettingsStore::in_memory().unwrap();

        let first = store.load_or_init(DEFAULT_SETTINGS_KEY).unwrap();
        assert_eq!(first, DisplaySettings::default());
        assert!(first.show_name);
        assert!(!first.show_notes);

        // Second load returns the stored row, not a fresh default.
        let second = store.load_or_init(DEFAULT_SETTINGS_KEY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_persists_and_round_trips() {
        let store = SqliteSettingsStore::in_memory().unwrap();

        let updated = store
            .update(
                DEFAULT_SETTINGS_KEY,
                &DisplaySettingsUpdate {
                    show_notes: Some(true),
                    items_per_page: Some(50),
                    sort_order: Some(SortOrder::Desc),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.show_notes);
        assert_eq!(updated.items_per_page, 50);
        assert_eq!(updated.sort_order, SortOrder::Desc);
        // Untouched fields keep their defaults.
        assert!(updated.show_email);

        let reloaded = store.load_or_init(DEFAULT_SETTINGS_KEY).unwrap();
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = SqliteSettingsStore::in_memory().unwrap();

        store
            .update(
                "alice",
                &DisplaySettingsUpdate {
                    terse_display: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(store.load_or_init("alice").unwrap().terse_display);
        assert!(!store.load_or_init("bob").unwrap().terse_display);
    }
}
