//! Predicate types for contact queries.
//!
//! A [`Predicate`] is the compiled form of a search string: an immutable
//! tree of substring and null-check conditions combined with AND/OR/NOT.
//! Trees are built per search request by the
//! [query compiler](crate::query::compile), evaluated either in memory via
//! [`Predicate::matches`] or translated to a backend-specific form via
//! [`PredicateTranslator`].

use serde::{Deserialize, Serialize};

use super::{Contact, ContactField};

/// A single condition over one contact field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Field the condition applies to.
    pub field: ContactField,
    /// Operator to apply.
    pub op: ConditionOp,
}

/// Condition operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    /// Field contains the term as a case-insensitive substring.
    Contains(String),
    /// Field is absent (null).
    IsNull,
}

/// Composite predicate with AND/OR/NOT logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every contact (empty query).
    All,
    /// Single condition.
    Condition(Condition),
    /// AND of multiple predicates.
    And(Vec<Predicate>),
    /// OR of multiple predicates.
    Or(Vec<Predicate>),
    /// NOT of a predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Create a contains condition on one field.
    pub fn contains(field: ContactField, term: impl Into<String>) -> Self {
        Predicate::Condition(Condition {
            field,
            op: ConditionOp::Contains(term.into()),
        })
    }

    /// Create a null check on one field.
    pub fn is_null(field: ContactField) -> Self {
        Predicate::Condition(Condition {
            field,
            op: ConditionOp::IsNull,
        })
    }

    /// Create an AND predicate.
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    /// Create an OR predicate.
    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Create a NOT predicate.
    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Leaf predicate: some searchable field contains the term.
    pub fn any_field_contains(term: impl Into<String>) -> Self {
        let term = term.into();
        Predicate::Or(
            ContactField::ALL
                .iter()
                .map(|f| Predicate::contains(*f, term.clone()))
                .collect(),
        )
    }

    /// Leaf predicate: some searchable field is absent.
    pub fn any_field_null() -> Self {
        Predicate::Or(
            ContactField::ALL
                .iter()
                .map(|f| Predicate::is_null(*f))
                .collect(),
        )
    }

    /// Evaluate against a contact, without side effects.
    ///
    /// Substring matching folds ASCII case only, the same folding
    /// SQLite's `lower()` applies in the SQL translation, so both
    /// evaluation paths agree on every input.
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Condition(cond) => {
                let value = contact.field(cond.field);
                match &cond.op {
                    ConditionOp::Contains(term) => value
                        .map(|v| {
                            v.to_ascii_lowercase()
                                .contains(term.to_ascii_lowercase().as_str())
                        })
                        .unwrap_or(false),
                    ConditionOp::IsNull => value.is_none(),
                }
            }
            Predicate::And(preds) => preds.iter().all(|p| p.matches(contact)),
            Predicate::Or(preds) => preds.iter().any(|p| p.matches(contact)),
            Predicate::Not(pred) => !pred.matches(contact),
        }
    }
}

/// Trait for translating predicates to backend-specific formats.
pub trait PredicateTranslator {
    type Output;
    type Error;

    /// Translate a predicate to the backend-specific format.
    fn translate(&self, predicate: &Predicate) -> Result<Self::Output, Self::Error>;
}
