//! Document module - Format-preserving YAML documents.
//!
//! A [`Document`] is parsed once and edited in place. Navigation goes through
//! [`Path`] values and edits only touch the bytes of the scalars they replace.

mod document;
mod error;
mod node;
mod parser;
mod path;
mod scalar;

#[cfg(test)]
mod document_test;

pub use document::*;
pub use error::*;
pub use node::*;
pub use path::*;
pub use scalar::{is_plain_safe, render, resolves_to_string};
