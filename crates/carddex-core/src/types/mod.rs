//! Core types for carddex.

mod contact;
mod predicate;
mod sort;

pub use contact::*;
pub use predicate::*;
pub use sort::*;
