//! SQLite-backed contact store.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{CarddexError, CarddexResult};
use crate::types::{
    Condition, ConditionOp, Contact, ContactFields, ContactPage, Page, Predicate,
    PredicateTranslator, SortOrder, SortSpec,
};

use super::ContactStore;

/// A compiled SQL `WHERE` fragment with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlWhere {
    pub clause: String,
    pub params: Vec<String>,
}

/// Translates predicates to SQLite `WHERE` fragments.
///
/// Substring conditions lower-case the column with SQLite's `lower()`,
/// which folds ASCII only, so the operand is ASCII-folded on the Rust
/// side to keep matching consistent with [`Predicate::matches`].
pub struct SqlitePredicateTranslator;

impl PredicateTranslator for SqlitePredicateTranslator {
    type Output = SqlWhere;
    type Error = CarddexError;

    fn translate(&self, predicate: &Predicate) -> Result<SqlWhere, CarddexError> {
        let mut params = Vec::new();
        let clause = translate_node(predicate, &mut params);
        Ok(SqlWhere { clause, params })
    }
}

fn translate_node(predicate: &Predicate, params: &mut Vec<String>) -> String {
    match predicate {
        Predicate::All => "1=1".to_string(),
        Predicate::Condition(Condition { field, op }) => match op {
            ConditionOp::Contains(term) => {
                params.push(term.to_ascii_lowercase());
                format!(
                    "instr(lower(coalesce({}, '')), ?) > 0",
                    field.as_str()
                )
            }
            ConditionOp::IsNull => format!("{} IS NULL", field.as_str()),
        },
        Predicate::And(preds) => combine(preds, " AND ", "1=1", params),
        Predicate::Or(preds) => combine(preds, " OR ", "1=0", params),
        Predicate::Not(inner) => format!("NOT ({})", translate_node(inner, params)),
    }
}

fn combine(
    preds: &[Predicate],
    joiner: &str,
    identity: &str,
    params: &mut Vec<String>,
) -> String {
    if preds.is_empty() {
        return identity.to_string();
    }
    let parts: Vec<String> = preds.iter().map(|p| translate_node(p, params)).collect();
    format!("({})", parts.join(joiner))
}

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, address, notes, version, active, created_at, updated_at";

/// SQLite-backed contact store.
pub struct SqliteContactStore {
    conn: Mutex<Connection>,
}

impl SqliteContactStore {
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
            CREATE TABLE IF NOT EXISTS contacts (
                id         TEXT PRIMARY KEY,
                name       TEXT,
                email      TEXT,
                phone      TEXT,
                address    TEXT,
                notes      TEXT,
                version    INTEGER NOT NULL DEFAULT 1,
                active     INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_contacts_active
                ON contacts(active, created_at);
        "#,
        )?;
        Ok(())
    }

    fn row_to_contact(row: &rusqlite::Row<'_>) -> CarddexResult<Contact> {
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        Ok(Contact {
            id: row.get(0)?,
            fields: ContactFields {
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
                notes: row.get(5)?,
            },
            version: row.get(6)?,
            active: row.get::<_, i64>(7)? != 0,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    fn order_by(sort: SortSpec) -> String {
        let direction = match sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        if sort.field.is_text() {
            format!("ORDER BY {} COLLATE NOCASE {}", sort.field.as_str(), direction)
        } else {
            format!("ORDER BY {} {}", sort.field.as_str(), direction)
        }
    }
}

fn parse_timestamp(s: &str) -> CarddexResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CarddexError::parse(e.to_string()))
}

impl ContactStore for SqliteContactStore {
    fn create(&self, fields: ContactFields) -> CarddexResult<Contact> {
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            fields,
            version: 1,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO contacts
               (id, name, email, phone, address, notes, version, active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            params![
                contact.id,
                contact.fields.name,
                contact.fields.email,
                contact.fields.phone,
                contact.fields.address,
                contact.fields.notes,
                contact.version,
                contact.active as i64,
                contact.created_at.to_rfc3339(),
                contact.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(contact)
    }

    fn get(&self, id: &str) -> CarddexResult<Option<Contact>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"
        ))?;

        stmt.query_row(params![id], |row| Ok(Self::row_to_contact(row)))
            .optional()?
            .transpose()
    }

    fn update(&self, id: &str, fields: &ContactFields, version: u32) -> CarddexResult<Contact> {
        let now = Utc::now();
        let changed = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"UPDATE contacts
                   SET name = ?1, email = ?2, phone = ?3, address = ?4, notes = ?5,
                       version = ?6, updated_at = ?7
                   WHERE id = ?8"#,
                params![
                    fields.name,
                    fields.email,
                    fields.phone,
                    fields.address,
                    fields.notes,
                    version,
                    now.to_rfc3339(),
                    id,
                ],
            )?
        };
        if changed == 0 {
            return Err(CarddexError::contact_not_found(id));
        }
        self.get(id)?
            .ok_or_else(|| CarddexError::contact_not_found(id))
    }

    fn find(
        &self,
        predicate: &Predicate,
        sort: SortSpec,
        page: Page,
    ) -> CarddexResult<ContactPage> {
        let SqlWhere { clause, params } = SqlitePredicateTranslator.translate(predicate)?;
        let conn = self.conn.lock().unwrap();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM contacts WHERE active = 1 AND ({clause})"),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE active = 1 AND ({clause})
             {} LIMIT {} OFFSET {}",
            Self::order_by(sort),
            page.size,
            page.offset(),
        ))?;

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(Self::row_to_contact(row))
        })?;
        let contacts: Vec<Contact> = rows
            .map(|r| r.map_err(CarddexError::from).and_then(|inner| inner))
            .collect::<CarddexResult<_>>()?;

        Ok(ContactPage {
            contacts,
            total: total as u64,
            page: page.number,
            page_size: page.size,
        })
    }

    fn soft_delete(&self, id: &str) -> CarddexResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("UPDATE contacts SET active = 0 WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CarddexError::contact_not_found(id));
        }
        Ok(())
    }

    fn restore_active(&self, id: &str) -> CarddexResult<Contact> {
        {
            let conn = self.conn.lock().unwrap();
            let changed =
                conn.execute("UPDATE contacts SET active = 1 WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(CarddexError::contact_not_found(id));
            }
        }
        self.get(id)?
            .ok_or_else(|| CarddexError::contact_not_found(id))
    }

    fn active_created_before(&self, timestamp: DateTime<Utc>) -> CarddexResult<Vec<Contact>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE active = 1 AND created_at <= ?1
             ORDER BY created_at ASC"
        ))?;

        let rows = stmt.query_map(params![timestamp.to_rfc3339()], |row| {
            Ok(Self::row_to_contact(row))
        })?;
        rows.map(|r| r.map_err(CarddexError::from).and_then(|inner| inner))
            .collect()
    }
}
