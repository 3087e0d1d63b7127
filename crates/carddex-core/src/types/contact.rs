//! Contact record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of searchable text attributes on a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Address,
    Notes,
}

impl ContactField {
    /// All searchable fields, in display order.
    pub const ALL: [ContactField; 5] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Address,
        ContactField::Notes,
    ];

    /// Convert to string for storage and column names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Address => "address",
            ContactField::Notes => "notes",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(ContactField::Name),
            "email" => Some(ContactField::Email),
            "phone" => Some(ContactField::Phone),
            "address" => Some(ContactField::Address),
            "notes" => Some(ContactField::Notes),
            _ => None,
        }
    }
}

/// The mutable field values of a contact, as one bundle.
///
/// Used both as the payload for creating a contact and as the value set
/// captured in a [`ContactSnapshot`](crate::versioning::ContactSnapshot).
/// A `None` field is absent (null in storage), which is what the
/// `empty <field>` search predicate matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ContactFields {
    /// Read a single field by name.
    pub fn get(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::Name => self.name.as_deref(),
            ContactField::Email => self.email.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::Notes => self.notes.as_deref(),
        }
    }

    /// Write a single field by name.
    pub fn set(&mut self, field: ContactField, value: Option<String>) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Address => self.address = value,
            ContactField::Notes => self.notes = value,
        }
    }

    /// True when every field is absent.
    pub fn is_empty(&self) -> bool {
        ContactField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// A contact record.
///
/// `version` starts at 1 and increments by exactly 1 on every mutation,
/// including restores. `active` is the soft-delete flag; inactive
/// contacts are excluded from search results but keep their history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier.
    pub id: String,
    #[serde(flatten)]
    pub fields: ContactFields,
    /// Monotonically increasing version counter, starting at 1.
    pub version: u32,
    /// Soft-delete flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Read a single searchable field.
    pub fn field(&self, field: ContactField) -> Option<&str> {
        self.fields.get(field)
    }
}

/// A typed partial update for a contact.
///
/// Each entry is a three-state edit: `None` leaves the field unchanged,
/// `Some(None)` clears it, `Some(Some(v))` sets it. Only the five
/// mutable fields can be touched; version, timestamps and the active
/// flag are owned by the store.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl ContactUpdate {
    /// Create an empty update (changes nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a field to a value.
    pub fn set(mut self, field: ContactField, value: impl Into<String>) -> Self {
        self.edit(field, Some(Some(value.into())));
        self
    }

    /// Builder: clear a field.
    pub fn clear(mut self, field: ContactField) -> Self {
        self.edit(field, Some(None));
        self
    }

    fn edit(&mut self, field: ContactField, edit: Option<Option<String>>) {
        match field {
            ContactField::Name => self.name = edit,
            ContactField::Email => self.email = edit,
            ContactField::Phone => self.phone = edit,
            ContactField::Address => self.address = edit,
            ContactField::Notes => self.notes = edit,
        }
    }

    /// True when no field is touched.
    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.notes.is_none()
    }

    /// Apply this update on top of an existing field set.
    pub fn apply_to(&self, fields: &mut ContactFields) {
        if let Some(edit) = &self.name {
            fields.name = edit.clone();
        }
        if let Some(edit) = &self.email {
            fields.email = edit.clone();
        }
        if let Some(edit) = &self.phone {
            fields.phone = edit.clone();
        }
        if let Some(edit) = &self.address {
            fields.address = edit.clone();
        }
        if let Some(edit) = &self.notes {
            fields.notes = edit.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trip() {
        for field in ContactField::ALL {
            assert_eq!(ContactField::from_str(field.as_str()), Some(field));
        }
        assert_eq!(ContactField::from_str("bogus"), None);
    }

    #[test]
    fn test_fields_get_set() {
        let mut fields = ContactFields::default();
        assert!(fields.is_empty());

        fields.set(ContactField::Email, Some("a@b.c".into()));
        assert_eq!(fields.get(ContactField::Email), Some("a@b.c"));
        assert!(!fields.is_empty());
        assert_eq!(fields.get(ContactField::Phone), None);
    }

    #[test]
    fn test_update_set_and_clear() {
        let mut fields = ContactFields {
            name: Some("Ada".into()),
            phone: Some("555-1234".into()),
            ..Default::default()
        };

        let update = ContactUpdate::new()
            .set(ContactField::Email, "ada@example.com")
            .clear(ContactField::Phone);
        update.apply_to(&mut fields);

        // Untouched field survives, cleared field becomes absent.
        assert_eq!(fields.name.as_deref(), Some("Ada"));
        assert_eq!(fields.email.as_deref(), Some("ada@example.com"));
        assert_eq!(fields.phone, None);
    }

    #[test]
    fn test_update_noop() {
        assert!(ContactUpdate::new().is_noop());
        assert!(!ContactUpdate::new().clear(ContactField::Notes).is_noop());
    }
}
