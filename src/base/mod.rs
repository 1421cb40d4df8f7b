//! Foundation types for the xref toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Interned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`SourceRange`] - A range anchored in a specific file
//!
//! This module has NO dependencies on other xref modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{SourceRange, TextRange, TextSize};
pub(crate) use span::range_from_offsets;

// Re-export text-size types for convenience
pub use text_size;
