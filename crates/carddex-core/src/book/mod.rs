//! The contact book: the composed operations callers use.

mod main;

pub use main::ContactBook;
