//! Batch data cleanup over the contact book.
//!
//! Maintenance passes for the grime a contact database accumulates:
//! mangled addresses from bad imports, blank names and emails, duplicate
//! records, and inconsistent formatting. Every field change goes through
//! [`ContactBook::update`], so each cleaned contact gains a version and
//! its prior state stays in history; duplicates are soft-deleted, never
//! removed.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::book::ContactBook;
use crate::error::CarddexResult;
use crate::types::{Contact, ContactField, ContactUpdate, Page, SortField, SortOrder, SortSpec};

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static WS_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
/// Anything that does not belong in a phone number.
static NON_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+\-()\s]").unwrap());

/// One batch cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    /// De-mangle addresses (escape sequences, separators, duplicate lines).
    Addresses,
    /// Repair missing names and emails.
    EmptyFields,
    /// Deactivate duplicate contacts sharing an email.
    Duplicates,
    /// All of the above plus phone/name/email normalization.
    General,
}

/// Statistics from a cleanup pass.
#[derive(Debug, Default, Clone)]
pub struct CleanupStats {
    /// Contacts modified (or deactivated, for the duplicate pass).
    pub cleaned: u64,
    /// Error messages for contacts that failed to clean.
    pub errors: Vec<String>,
}

impl CleanupStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the pass completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn absorb(&mut self, other: CleanupStats) {
        self.cleaned += other.cleaned;
        self.errors.extend(other.errors);
    }
}

/// Run one cleanup pass over every active contact.
pub fn run_cleanup(book: &ContactBook, action: CleanupAction) -> CarddexResult<CleanupStats> {
    match action {
        CleanupAction::Addresses => cleanup_addresses(book),
        CleanupAction::EmptyFields => cleanup_empty_fields(book),
        CleanupAction::Duplicates => cleanup_duplicates(book),
        CleanupAction::General => general_cleanup(book),
    }
}

/// Every active contact, oldest first.
fn all_active(book: &ContactBook) -> CarddexResult<Vec<Contact>> {
    let sort = SortSpec {
        field: SortField::CreatedAt,
        order: SortOrder::Asc,
    };
    Ok(book.search("", sort, Page::new(1, u32::MAX))?.contacts)
}

fn record_update(
    book: &ContactBook,
    contact: &Contact,
    update: &ContactUpdate,
    stats: &mut CleanupStats,
) {
    match book.update(&contact.id, update) {
        Ok(_) => stats.cleaned += 1,
        Err(e) => {
            warn!(contact_id = %contact.id, error = %e, "cleanup update failed");
            stats.errors.push(format!("{}: {}", contact.id, e));
        }
    }
}

/// Normalize a stored address.
///
/// Converts quoted-printable `0D=0A` escapes and `:::` separators to
/// newlines, collapses newline runs, trims, and drops duplicate lines
/// while keeping first-seen order.
fn normalize_address(address: &str) -> String {
    let replaced = address.replace("0D=0A", "\n").replace(":::", "\n");
    let collapsed = NEWLINE_RUNS.replace_all(&replaced, "\n");
    let mut seen = HashSet::new();
    collapsed
        .trim()
        .split('\n')
        .filter(|line| seen.insert(line.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// De-mangle addresses. A contact is touched only when normalization
/// actually changes its address.
pub fn cleanup_addresses(book: &ContactBook) -> CarddexResult<CleanupStats> {
    let mut stats = CleanupStats::new();
    for contact in all_active(book)? {
        let Some(address) = contact.fields.address.as_deref() else {
            continue;
        };
        let cleaned = normalize_address(address);
        if cleaned != address {
            let update = ContactUpdate::new().set(ContactField::Address, cleaned);
            record_update(book, &contact, &update, &mut stats);
        }
    }
    debug!(cleaned = stats.cleaned, errors = stats.errors.len(), "address cleanup finished");
    Ok(stats)
}

/// Derive a display name from an email's local part, so
/// `john.doe@example.com` becomes `John Doe`.
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Repair contacts with a missing name or email.
///
/// A missing name is derived from the email's local part when there is
/// one, falling back to `"Unknown Contact"`. A missing email gets a
/// placeholder built from the name; a contact with neither keeps its
/// email absent.
pub fn cleanup_empty_fields(book: &ContactBook) -> CarddexResult<CleanupStats> {
    let mut stats = CleanupStats::new();
    for contact in all_active(book)? {
        let name_blank = is_blank(contact.fields.name.as_deref());
        let email_blank = is_blank(contact.fields.email.as_deref());
        if !name_blank && !email_blank {
            continue;
        }

        let mut update = ContactUpdate::new();
        if name_blank {
            let derived = contact
                .fields
                .email
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .map(name_from_email)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown Contact".to_string());
            update = update.set(ContactField::Name, derived);
        }
        if email_blank {
            match contact.fields.name.as_deref().filter(|n| !n.trim().is_empty()) {
                Some(name) => {
                    let local = WS_RUNS.replace_all(name.trim(), ".").to_lowercase();
                    update = update.set(ContactField::Email, format!("{local}@example.com"));
                }
                // No name to derive from; drop an empty-string email.
                None if contact.fields.email.is_some() => {
                    update = update.clear(ContactField::Email);
                }
                None => {}
            }
        }

        record_update(book, &contact, &update, &mut stats);
    }
    debug!(cleaned = stats.cleaned, errors = stats.errors.len(), "empty-field cleanup finished");
    Ok(stats)
}

/// Deactivate duplicate contacts that share an email.
///
/// Emails are compared lower-cased and trimmed. The oldest contact in
/// each group stays active; the rest are soft-deleted, so their history
/// survives and they can be reactivated.
pub fn cleanup_duplicates(book: &ContactBook) -> CarddexResult<CleanupStats> {
    let mut stats = CleanupStats::new();
    let mut seen: HashSet<String> = HashSet::new();

    // all_active returns oldest first, so the first holder of an email
    // is the one kept.
    for contact in all_active(book)? {
        let Some(email) = contact.fields.email.as_deref() else {
            continue;
        };
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        if seen.insert(normalized) {
            continue;
        }
        match book.delete(&contact.id) {
            Ok(()) => stats.cleaned += 1,
            Err(e) => {
                warn!(contact_id = %contact.id, error = %e, "duplicate deactivation failed");
                stats.errors.push(format!("{}: {}", contact.id, e));
            }
        }
    }
    debug!(cleaned = stats.cleaned, errors = stats.errors.len(), "duplicate cleanup finished");
    Ok(stats)
}

/// Run every cleanup pass, then normalize formatting.
///
/// The formatting pass strips non-phone characters from phone numbers,
/// collapses whitespace runs in names, and lower-cases and trims emails.
pub fn general_cleanup(book: &ContactBook) -> CarddexResult<CleanupStats> {
    let mut stats = cleanup_addresses(book)?;
    stats.absorb(cleanup_empty_fields(book)?);
    stats.absorb(cleanup_duplicates(book)?);

    for contact in all_active(book)? {
        let mut update = ContactUpdate::new();
        let mut changed = false;

        if let Some(phone) = contact.fields.phone.as_deref() {
            let stripped = NON_PHONE.replace_all(phone, "");
            let cleaned = WS_RUNS.replace_all(&stripped, " ").trim().to_string();
            if cleaned != phone {
                update = update.set(ContactField::Phone, cleaned);
                changed = true;
            }
        }
        if let Some(name) = contact.fields.name.as_deref() {
            let cleaned = WS_RUNS.replace_all(name, " ").trim().to_string();
            if cleaned != name {
                update = update.set(ContactField::Name, cleaned);
                changed = true;
            }
        }
        if let Some(email) = contact.fields.email.as_deref() {
            let cleaned = email.trim().to_lowercase();
            if cleaned != email {
                update = update.set(ContactField::Email, cleaned);
                changed = true;
            }
        }

        if changed {
            record_update(book, &contact, &update, &mut stats);
        }
    }
    debug!(cleaned = stats.cleaned, errors = stats.errors.len(), "general cleanup finished");
    Ok(stats)
}
