//! CSV import for contact data.
//!
//! Reads a headered CSV, resolves each contact field through the caller's
//! column mapping, and creates contacts through the [`ContactBook`].
//! Malformed rows are recorded as errors but don't abort the import.

use std::io::Read;

use tracing::debug;

use crate::book::ContactBook;
use crate::error::CarddexResult;
use crate::import::{ColumnMapping, ImportStats};
use crate::types::{ContactField, ContactFields};

/// Resolved column indices for one contact field.
struct FieldColumns {
    field: ContactField,
    indices: Vec<usize>,
}

/// Import contacts from CSV.
///
/// Rows import at version 1 through [`ContactBook::create`]. A row whose
/// mapped cells are all empty is skipped; a row that fails to parse or to
/// persist is recorded in [`ImportStats::errors`] and the import
/// continues. Only a completely unreadable header fails the whole call.
pub fn import_csv<R: Read>(
    reader: R,
    mapping: &ColumnMapping,
    book: &ContactBook,
) -> CarddexResult<ImportStats> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns: Vec<FieldColumns> = ContactField::ALL
        .iter()
        .map(|field| FieldColumns {
            field: *field,
            indices: mapping
                .candidates(*field)
                .iter()
                .filter_map(|candidate| headers.iter().position(|h| h == candidate))
                .collect(),
        })
        .collect();

    let mut stats = ImportStats::new();

    for record in csv_reader.records() {
        stats.total += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Parse error at row {}: {}", stats.total, e));
                continue;
            }
        };

        let mut fields = ContactFields::default();
        for column in &columns {
            // First candidate column with a non-empty cell wins.
            let value = column
                .indices
                .iter()
                .filter_map(|&i| record.get(i))
                .map(str::trim)
                .find(|v| !v.is_empty());
            fields.set(column.field, value.map(String::from));
        }

        if fields.is_empty() {
            stats.skipped += 1;
            continue;
        }

        match book.create(fields) {
            Ok(_) => stats.imported += 1,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Import error at row {}: {}", stats.total, e));
            }
        }
    }

    debug!(
        total = stats.total,
        imported = stats.imported,
        skipped = stats.skipped,
        errors = stats.errors.len(),
        "csv import finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteContactStore;
    use crate::types::{Page, SortSpec};
    use crate::versioning::SqliteSnapshotStore;
    use std::io::Cursor;
    use std::sync::Arc;

    fn book() -> ContactBook {
        ContactBook::new(
            Arc::new(SqliteContactStore::in_memory().unwrap()),
            Arc::new(SqliteSnapshotStore::in_memory().unwrap()),
        )
    }

    fn simple_mapping() -> ColumnMapping {
        ColumnMapping::default()
            .map(ContactField::Name, "Name")
            .map(ContactField::Email, "Email")
            .map(ContactField::Email, "Alt Email")
            .map(ContactField::Phone, "Phone")
    }

    #[test]
    fn test_import_basic() {
        let csv = "Name,Email,Alt Email,Phone\n\
                   Ada Lovelace,ada@example.com,,555-0100\n\
                   Alan Turing,,alan@example.com,\n";
        let book = book();

        let stats = import_csv(Cursor::new(csv), &simple_mapping(), &book).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.imported, 2);
        assert!(stats.is_success());

        let page = book.search("", SortSpec::default(), Page::default()).unwrap();
        assert_eq!(page.total, 2);

        // Second candidate column filled in the missing primary email.
        let alan = book
            .search("Alan", SortSpec::default(), Page::default())
            .unwrap();
        assert_eq!(
            alan.contacts[0].fields.email.as_deref(),
            Some("alan@example.com")
        );
        assert_eq!(alan.contacts[0].fields.phone, None);
        assert_eq!(alan.contacts[0].version, 1);
    }

    #[test]
    fn test_import_skips_blank_rows() {
        let csv = "Name,Email,Alt Email,Phone\n\
                   ,,,\n\
                   Ada,,,\n";
        let book = book();

        let stats = import_csv(Cursor::new(csv), &simple_mapping(), &book).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.imported, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_import_records_row_errors_and_continues() {
        // Middle row has the wrong number of fields and fails to parse.
        let csv = "Name,Email,Alt Email,Phone\n\
                   Ada,,,\n\
                   Bob,,,,,extra\n\
                   Alan,,,\n";
        let book = book();

        let stats = import_csv(Cursor::new(csv), &simple_mapping(), &book).unwrap();
        assert!(!stats.is_success());
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].contains("row 2"));
    }

    #[test]
    fn test_unmapped_columns_are_ignored() {
        let csv = "Name,Favorite Color\nAda,mauve\n";
        let book = book();

        let stats = import_csv(
            Cursor::new(csv),
            &ColumnMapping::default().map(ContactField::Name, "Name"),
            &book,
        )
        .unwrap();
        assert_eq!(stats.imported, 1);

        let ada = book
            .search("Ada", SortSpec::default(), Page::default())
            .unwrap();
        assert_eq!(ada.contacts[0].fields.notes, None);
    }
}
