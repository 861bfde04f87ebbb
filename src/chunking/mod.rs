//! Document chunking
//!
//! Splits normalized page text into overlapping, size-bounded windows that
//! prefer to end at a sentence boundary.

mod splitter;

pub use splitter::*;
