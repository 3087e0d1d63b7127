//! Free-text query compiler.
//!
//! Turns a raw search string with `AND`/`OR`/`NOT` operators and quoted
//! phrases into a [`Predicate`](crate::types::Predicate) tree over the
//! fixed searchable fields. Compilation never fails; malformed input
//! degrades to the closest sensible predicate.

mod compiler;
mod tokenizer;

pub use compiler::compile;
pub use tokenizer::{tokenize, Operator, Token};
