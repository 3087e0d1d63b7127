//! Contact import from external sources.
//!
//! CSV is the only supported format. The caller supplies an explicit
//! [`ColumnMapping`]; there is no header sniffing or column guessing.

mod csv_import;

pub use csv_import::import_csv;

use crate::types::ContactField;

/// Statistics from an import operation.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    /// Total data rows processed.
    pub total: u64,
    /// Successfully imported contacts.
    pub imported: u64,
    /// Skipped rows (every mapped field empty).
    pub skipped: u64,
    /// Error messages for failed rows.
    pub errors: Vec<String>,
}

impl ImportStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the import completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the error rate as a percentage.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.errors.len() as f64 / self.total as f64) * 100.0
        }
    }
}

/// Maps contact fields to candidate CSV column headers.
///
/// Each field lists headers in priority order; the first candidate with a
/// non-empty cell wins. A field with no candidates, or with only empty
/// cells in a row, imports as absent.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    pub name: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub address: Vec<String>,
    pub notes: Vec<String>,
}

impl ColumnMapping {
    /// Builder: add a candidate column for a field.
    pub fn map(mut self, field: ContactField, header: impl Into<String>) -> Self {
        self.candidates_mut(field).push(header.into());
        self
    }

    /// Candidate headers for a field, in priority order.
    pub fn candidates(&self, field: ContactField) -> &[String] {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Address => &self.address,
            ContactField::Notes => &self.notes,
        }
    }

    fn candidates_mut(&mut self, field: ContactField) -> &mut Vec<String> {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Address => &mut self.address,
            ContactField::Notes => &mut self.notes,
        }
    }

    /// The fixed mapping for Google Contacts CSV exports.
    pub fn google_contacts() -> Self {
        Self {
            name: vec!["Name".into()],
            email: vec![
                "E-mail 1 - Value".into(),
                "E-mail 2 - Value".into(),
                "E-mail 3 - Value".into(),
            ],
            phone: vec![
                "Phone 1 - Value".into(),
                "Phone 2 - Value".into(),
                "Phone 3 - Value".into(),
            ],
            address: vec![
                "Address 1 - Formatted".into(),
                "Address 1 - Street".into(),
            ],
            notes: vec!["Notes".into()],
        }
    }
}
