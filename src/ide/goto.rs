//! Go-to-declaration implementation.

use std::sync::Arc;

use crate::base::{FileId, SourceRange, TextRange};
use crate::hir::{Declaration, ReferenceKind, Resolver};

use super::SymbolKind;

/// Result of a go-to-declaration request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn multiple(targets: Vec<GotoTarget>) -> Self {
        Self { targets }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn locations(&self) -> Vec<SourceRange> {
        self.targets.iter().map(GotoTarget::location).collect()
    }
}

/// A target location for go-to-declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    /// The file containing the target.
    pub file: FileId,
    pub range: TextRange,
    pub kind: SymbolKind,
    /// The declaration name.
    pub name: Arc<str>,
}

impl GotoTarget {
    pub fn location(&self) -> SourceRange {
        SourceRange::new(self.file, self.range)
    }
}

impl From<&Declaration> for GotoTarget {
    fn from(decl: &Declaration) -> Self {
        let location = decl.location();
        Self {
            file: location.file,
            range: location.range,
            kind: SymbolKind::of(decl),
            name: Arc::from(decl.name()),
        }
    }
}

/// Declarations `text` refers to when written as a reference of `kind`.
///
/// Ambiguous references yield one target per candidate; unresolved ones
/// yield none.
pub fn targets_for(
    resolver: &Resolver<'_>,
    kind: ReferenceKind,
    text: &str,
    context: Option<FileId>,
) -> GotoResult {
    let targets = resolver
        .resolve(kind, text, context)
        .declarations()
        .iter()
        .map(GotoTarget::from)
        .collect();
    GotoResult::multiple(targets)
}
