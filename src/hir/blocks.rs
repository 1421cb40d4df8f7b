//! Template block graph.
//!
//! The blocks visible at a template are its own blocks followed by those of
//! every template reachable through `extends`, `embed` and `use`, walked
//! depth-first in that order. Blocks are deduplicated by name: the first
//! declaration met is the primary one, and every declaration is kept.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::base::FileId;

use super::config::AnalysisConfig;
use super::declarations::{DeclKind, Declaration, TemplateBlockDeclaration, TemplateDeclaration};
use super::index::ProjectIndex;

/// A block name visible at a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleBlock {
    pub name: String,
    /// Most-derived declaration, used for go-to-definition.
    pub primary: Arc<TemplateBlockDeclaration>,
    /// Every declaration in traversal order, `primary` first.
    pub all: Vec<Arc<TemplateBlockDeclaration>>,
}

impl VisibleBlock {
    /// Whether the primary declaration overrides an ancestor's block.
    pub fn overrides_parent(&self) -> bool {
        self.all.len() > 1
    }
}

/// The template declared in `file`, if any.
pub fn template_of_file(index: &ProjectIndex, file: FileId) -> Option<Arc<TemplateDeclaration>> {
    index
        .declarations_in_file(file)
        .iter()
        .find_map(|d| d.as_template().cloned())
}

/// Blocks visible at `template`. `None` if `cancel` fires.
pub fn blocks_visible_at(
    index: &ProjectIndex,
    template: &str,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Option<Vec<VisibleBlock>> {
    let mut visible: IndexMap<String, VisibleBlock> = IndexMap::new();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut stack = vec![(template.trim().to_string(), 0usize)];

    while let Some((name, depth)) = stack.pop() {
        if cancel.is_cancelled() {
            debug!(template, "block traversal cancelled");
            return None;
        }
        if !visited.insert(name.clone()) {
            continue;
        }
        if depth > config.max_chain_hops {
            warn!(template, at = %name, "template chain exceeds hop limit");
            continue;
        }
        let Some(Declaration::Template(decl)) = index.lookup(DeclKind::Template, &name) else {
            continue;
        };

        for block in blocks_of(index, &decl) {
            match visible.get_mut(&block.name) {
                Some(entry) => entry.all.push(block),
                None => {
                    visible.insert(
                        block.name.clone(),
                        VisibleBlock {
                            name: block.name.clone(),
                            primary: block.clone(),
                            all: vec![block],
                        },
                    );
                }
            }
        }

        let parents = decl.extends.iter().chain(&decl.embeds).chain(&decl.uses);
        for parent in parents.rev() {
            stack.push((parent.name.clone(), depth + 1));
        }
    }

    Some(visible.into_values().collect())
}

/// Every block named `name` across the project.
pub fn by_global_name(index: &ProjectIndex, name: &str) -> Vec<Arc<TemplateBlockDeclaration>> {
    index
        .query(DeclKind::TemplateBlock, name.trim())
        .into_iter()
        .filter_map(|d| d.as_block().cloned())
        .collect()
}

fn blocks_of(index: &ProjectIndex, template: &TemplateDeclaration) -> Vec<Arc<TemplateBlockDeclaration>> {
    index
        .declarations_in_file(template.location.file)
        .iter()
        .filter_map(Declaration::as_block)
        .filter(|b| b.template_path == template.path)
        .cloned()
        .collect()
}
