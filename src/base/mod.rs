//! Foundation types for the weft toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Opaque file identifiers assigned by the project
//! - [`ContentHash`] - xxh3 digest of a file's bytes, used for staleness checks
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`Name`], [`Interner`] - String interning for stub names
//!
//! This module has NO dependencies on other weft modules.

mod file_id;
mod hash;
mod intern;

pub use file_id::FileId;
pub use hash::ContentHash;
pub use intern::{Interner, Name};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
