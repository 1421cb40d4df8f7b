//! Source ranges.
//!
//! Syntax nodes handed to us by the host carry plain byte ranges
//! ([`TextRange`]). Once a declaration leaves its file it needs to remember
//! which file it came from, which is what [`SourceRange`] is for.

pub use text_size::{TextRange, TextSize};

use super::FileId;

/// A byte range inside a specific file.
///
/// This is the `(file, offset, length)` triple navigation targets and
/// diagnostics are reported with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub file: FileId,
    pub range: TextRange,
}

impl SourceRange {
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    /// Byte offset of the start of the range.
    pub fn offset(&self) -> u32 {
        self.range.start().into()
    }

    /// Length of the range in bytes.
    pub fn len(&self) -> u32 {
        self.range.len().into()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Check whether a byte offset in the same file falls inside this range.
    pub fn contains(&self, file: FileId, offset: TextSize) -> bool {
        self.file == file && self.range.contains_inclusive(offset)
    }
}

/// Build a [`TextRange`] from `usize` offsets coming out of a reader.
pub(crate) fn range_from_offsets(start: usize, end: usize) -> TextRange {
    let start = TextSize::from(start as u32);
    let end = TextSize::from(end.max(start.into()) as u32);
    TextRange::new(start, end)
}
