//! Find-references: every declaration of a block name, every site naming a
//! method.

use tokio_util::sync::CancellationToken;

use crate::base::{FileId, SourceRange};
use crate::hir::{
    AnalysisConfig, Declaration, ProjectIndex, Resolver, ServiceGraph, SiteOwner, blocks_visible_at,
    by_global_name, template_of_file,
};

use super::SymbolKind;

/// Result of a find-references request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceResult {
    /// All references found.
    pub references: Vec<Reference>,
}

impl ReferenceResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn locations(&self) -> Vec<SourceRange> {
        self.references.iter().map(|r| r.location).collect()
    }
}

/// A reference to a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub location: SourceRange,
    /// Whether this is a declaration (vs a use).
    pub is_definition: bool,
    pub kind: SymbolKind,
}

impl Reference {
    fn declaration(decl: &Declaration) -> Self {
        Self {
            location: decl.location(),
            is_definition: true,
            kind: SymbolKind::of(decl),
        }
    }
}

/// Every declaration of block `name` as seen from `context`.
///
/// Inside a template the inheritance chain decides: the most-derived
/// declaration comes first, followed by the ones it overrides. Outside a
/// template, or when the block is not visible there, every block of that
/// name in the project is returned. `None` if `cancel` fires.
pub fn find_block_declarations(
    index: &ProjectIndex,
    config: &AnalysisConfig,
    context: Option<FileId>,
    name: &str,
    cancel: &CancellationToken,
) -> Option<ReferenceResult> {
    let name = name.trim();
    if let Some(template) = context.and_then(|file| template_of_file(index, file)) {
        let visible = blocks_visible_at(index, &template.path, config, cancel)?;
        if let Some(block) = visible.into_iter().find(|b| b.name == name) {
            return Some(ReferenceResult {
                references: block
                    .all
                    .into_iter()
                    .map(|decl| Reference::declaration(&Declaration::Block(decl)))
                    .collect(),
            });
        }
    }
    Some(ReferenceResult {
        references: by_global_name(index, name)
            .into_iter()
            .map(|decl| Reference::declaration(&Declaration::Block(decl)))
            .collect(),
    })
}

/// Reference sites naming `method` on `class_fqn`, across the project.
pub fn find_method_references(
    index: &ProjectIndex,
    services: &ServiceGraph,
    config: &AnalysisConfig,
    class_fqn: &str,
    method: &str,
) -> ReferenceResult {
    let class_fqn = class_fqn.trim_start_matches('\\');
    let resolver = Resolver::new(index, services, config);
    let mut references = Vec::new();

    for (file, _) in index.files() {
        for site in index.sites_in_file(file) {
            if !site.method.eq_ignore_ascii_case(method) {
                continue;
            }
            let owner = match site.owner {
                SiteOwner::ClassValue(ref value) => resolver.class_value_fqn(value),
                SiteOwner::Class(ref fqn) => Some(fqn.clone()),
            };
            if owner.is_some_and(|owner| owner.eq_ignore_ascii_case(class_fqn)) {
                references.push(Reference {
                    location: site.range,
                    is_definition: false,
                    kind: SymbolKind::Method,
                });
            }
        }
    }

    ReferenceResult { references }
}
