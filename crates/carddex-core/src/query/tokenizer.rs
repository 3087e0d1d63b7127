//! Search string tokenization.
//!
//! Splits on whitespace while keeping double-quoted substrings together,
//! and classifies unquoted `AND`/`OR`/`NOT` words as operators. Quoting
//! an operator word turns it back into an ordinary search term.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches either a run of non-space, non-quote characters or a quoted
/// span, glued together, so `ab"c d"e` stays one token.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).unwrap());

/// Boolean operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    /// Classify a raw (unstripped) token. Quoted operator words contain
    /// quote characters and therefore never classify as operators.
    fn from_raw(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("AND") {
            Some(Operator::And)
        } else if raw.eq_ignore_ascii_case("OR") {
            Some(Operator::Or)
        } else if raw.eq_ignore_ascii_case("NOT") {
            Some(Operator::Not)
        } else {
            None
        }
    }
}

/// One token of a search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with all quote characters stripped.
    pub text: String,
    /// Set when the raw token is an unquoted operator word.
    pub op: Option<Operator>,
}

impl Token {
    /// True when this token is an operator.
    pub fn is_operator(&self) -> bool {
        self.op.is_some()
    }
}

/// Tokenize a search string.
///
/// Stray quotes do not fail tokenization; they are simply stripped from
/// the token text.
pub fn tokenize(query: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(query)
        .map(|m| {
            let raw = m.as_str();
            Token {
                text: raw.replace('"', ""),
                op: Operator::from_raw(raw),
            }
        })
        .collect()
}
