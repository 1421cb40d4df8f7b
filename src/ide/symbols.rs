//! Symbol listing for workspace and document views.

use std::sync::Arc;

use crate::base::{FileId, TextRange};
use crate::hir::{DeclKind, Declaration, ProjectIndex};

/// Kind of a listed symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Service,
    Parameter,
    Route,
    Event,
    Block,
    Template,
    Class,
    Method,
}

impl SymbolKind {
    pub fn of(decl: &Declaration) -> Self {
        match decl {
            Declaration::Service(_) => SymbolKind::Service,
            Declaration::Parameter(_) => SymbolKind::Parameter,
            Declaration::Route(_) => SymbolKind::Route,
            Declaration::Event(_) => SymbolKind::Event,
            Declaration::Block(_) => SymbolKind::Block,
            Declaration::Template(_) => SymbolKind::Template,
            Declaration::Class(_) => SymbolKind::Class,
            Declaration::Method { .. } => SymbolKind::Method,
        }
    }

    /// Convert to LSP symbol kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            SymbolKind::Service => 13,   // Variable
            SymbolKind::Parameter => 14, // Constant
            SymbolKind::Route => 20,     // Key
            SymbolKind::Event => 24,     // Event
            SymbolKind::Block => 23,     // Struct
            SymbolKind::Template => 1,   // File
            SymbolKind::Class => 5,      // Class
            SymbolKind::Method => 6,     // Method
        }
    }
}

/// A symbol for the workspace symbol list or document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    /// Enclosing class of a method, owning template of a block.
    pub container: Option<Arc<str>>,
    pub kind: SymbolKind,
    /// File containing the symbol.
    pub file: FileId,
    pub range: TextRange,
}

impl SymbolInfo {
    pub fn from_declaration(decl: &Declaration) -> Self {
        let location = decl.location();
        let container = match decl {
            Declaration::Method { class, .. } => Some(Arc::from(class.fqn.as_str())),
            Declaration::Block(block) => Some(Arc::from(block.template_path.as_str())),
            Declaration::Event(event) => Some(Arc::from(event.owning_class.as_str())),
            _ => None,
        };
        Self {
            name: Arc::from(decl.name()),
            container,
            kind: SymbolKind::of(decl),
            file: location.file,
            range: location.range,
        }
    }
}

/// Get all symbols in the workspace, optionally filtered by a query.
///
/// The query is a case-insensitive substring match on the name. Results
/// are sorted by name.
pub fn workspace_symbols(index: &ProjectIndex, query: Option<&str>) -> Vec<SymbolInfo> {
    let query_lower = query.map(|q| q.to_lowercase());

    let mut results: Vec<SymbolInfo> = DeclKind::ALL
        .iter()
        .flat_map(|kind| index.declarations_of_kind(*kind))
        .filter(|decl| match query_lower {
            Some(ref q) => decl.name().to_lowercase().contains(q.as_str()),
            None => true,
        })
        .map(|decl| SymbolInfo::from_declaration(&decl))
        .collect();

    results.sort_by(|a, b| a.name.cmp(&b.name).then(a.file.cmp(&b.file)));
    results
}

/// Get all symbols in a specific file for document outline, in source order.
///
/// Class methods are listed after their class.
pub fn document_symbols(index: &ProjectIndex, file: FileId) -> Vec<SymbolInfo> {
    let mut results = Vec::new();
    for decl in index.declarations_in_file(file) {
        results.push(SymbolInfo::from_declaration(decl));
        if let Declaration::Class(class) = decl {
            for position in 0..class.methods.len() {
                results.push(SymbolInfo::from_declaration(&Declaration::Method {
                    class: class.clone(),
                    index: position,
                }));
            }
        }
    }

    // Sort by position in file
    results.sort_by_key(|s| (s.range.start(), s.range.end()));
    results
}
