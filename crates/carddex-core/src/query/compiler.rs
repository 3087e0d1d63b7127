//! Query compilation: token stream to predicate tree.

use crate::types::{ContactField, Predicate};

use super::tokenizer::{tokenize, Operator, Token};

/// Compile a search string into a predicate.
///
/// Never fails. Empty input compiles to [`Predicate::All`]; incomplete
/// clauses (a trailing operator, stray quotes) are dropped rather than
/// rejected.
///
/// Three paths, checked in order:
///
/// 1. `empty <field>` — a null check on the named field, or on every
///    field when the name is unrecognized. Checked on the trimmed,
///    lower-cased query before any tokenization.
/// 2. No operator tokens — a single any-field substring leaf built from
///    the whole query string as given, not from the individual tokens.
/// 3. Operator parse — one left-to-right pass, no precedence, no
///    parentheses; see `parse_with_operators` for the exact rules.
pub fn compile(query: &str) -> Predicate {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Predicate::All;
    }

    if let Some(rest) = trimmed.to_lowercase().strip_prefix("empty ") {
        return match ContactField::from_str(rest.trim()) {
            Some(field) => Predicate::is_null(field),
            None => Predicate::any_field_null(),
        };
    }

    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Predicate::All;
    }

    if !tokens.iter().any(Token::is_operator) {
        return Predicate::any_field_contains(query);
    }

    parse_with_operators(&tokens)
}

/// Single left-to-right pass over an operator-bearing token stream.
///
/// Maintains an ordered list of accumulated predicates:
///
/// - a bare term pushes a new any-field leaf;
/// - `NOT term` pushes a negated leaf as a new entry;
/// - `AND term` replaces the last entry with `AND(last, leaf)` — it binds
///   to the most recent entry, not the first;
/// - `OR term` pushes a new independent entry.
///
/// Whatever remains is conjoined. Because every entry ends up ANDed
/// together, `OR` never truly disjoins with its neighbors; this is
/// long-standing search behavior kept for compatibility rather than
/// boolean soundness, and it is pinned by regression tests.
fn parse_with_operators(tokens: &[Token]) -> Predicate {
    let mut nodes: Vec<Predicate> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].op {
            Some(Operator::Not) => {
                i += 1;
                if let Some(operand) = tokens.get(i) {
                    nodes.push(Predicate::not(Predicate::any_field_contains(
                        operand.text.as_str(),
                    )));
                }
            }
            Some(Operator::And) => {
                i += 1;
                if let Some(operand) = tokens.get(i) {
                    if let Some(last) = nodes.pop() {
                        nodes.push(Predicate::and(vec![
                            last,
                            Predicate::any_field_contains(operand.text.as_str()),
                        ]));
                    }
                    // A leading AND has nothing to bind to; its operand is
                    // dropped. Kept for compatibility.
                }
            }
            Some(Operator::Or) => {
                i += 1;
                if let Some(operand) = tokens.get(i) {
                    nodes.push(Predicate::any_field_contains(operand.text.as_str()));
                }
            }
            None => nodes.push(Predicate::any_field_contains(tokens[i].text.as_str())),
        }
        i += 1;
    }

    match nodes.len() {
        0 => Predicate::All,
        1 => nodes.into_iter().next().unwrap(),
        _ => Predicate::and(nodes),
    }
}
