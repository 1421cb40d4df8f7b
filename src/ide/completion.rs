//! Completion suggestions for reference text.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::base::FileId;
use crate::hir::{
    AnalysisConfig, DeclKind, Declaration, ProjectIndex, ReferenceKind, ServiceGraph,
    blocks_visible_at, template_of_file,
};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Service,
    Parameter,
    Route,
    Event,
    Block,
    Template,
    Class,
    Method,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Service => 6,    // Variable
            CompletionKind::Parameter => 21, // Constant
            CompletionKind::Route => 18,     // Reference
            CompletionKind::Event => 23,     // Event
            CompletionKind::Block => 22,     // Struct
            CompletionKind::Template => 17,  // File
            CompletionKind::Class => 7,      // Class
            CompletionKind::Method => 2,     // Method
        }
    }

    fn of(decl: &Declaration) -> Self {
        match decl {
            Declaration::Service(_) => CompletionKind::Service,
            Declaration::Parameter(_) => CompletionKind::Parameter,
            Declaration::Route(_) => CompletionKind::Route,
            Declaration::Event(_) => CompletionKind::Event,
            Declaration::Block(_) => CompletionKind::Block,
            Declaration::Template(_) => CompletionKind::Template,
            Declaration::Class(_) => CompletionKind::Class,
            Declaration::Method { .. } => CompletionKind::Method,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// The declaration the label stands for.
    pub target: Declaration,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, target: Declaration) -> Self {
        Self {
            label: label.into(),
            kind: CompletionKind::of(&target),
            detail: None,
            target,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }
}

/// Candidates for a reference of `kind` written in `context`.
///
/// Each name appears once, paired with its winning declaration. Block names
/// in a template file are limited to the blocks visible there. Returns
/// `None` if `cancel` fires during the block walk.
pub fn lookup_elements_for(
    index: &ProjectIndex,
    services: &ServiceGraph,
    config: &AnalysisConfig,
    kind: ReferenceKind,
    context: Option<FileId>,
    cancel: &CancellationToken,
) -> Option<Vec<CompletionItem>> {
    let mut items = match kind {
        ReferenceKind::ServiceId => service_items(services),
        ReferenceKind::Controller => controller_items(index),
        ReferenceKind::BlockName => {
            let template = context.and_then(|file| template_of_file(index, file));
            match template {
                Some(template) => blocks_visible_at(index, &template.path, config, cancel)?
                    .into_iter()
                    .map(|block| {
                        let detail = block.primary.template_path.clone();
                        CompletionItem::new(block.name, Declaration::Block(block.primary))
                            .with_detail(detail)
                            .with_priority(10)
                    })
                    .collect(),
                None => named_items(index, DeclKind::TemplateBlock),
            }
        }
        other => named_items(index, other.decl_kind()),
    };
    items.sort_by(|a, b| {
        a.sort_priority
            .cmp(&b.sort_priority)
            .then_with(|| a.label.cmp(&b.label))
    });
    Some(items)
}

fn named_items(index: &ProjectIndex, kind: DeclKind) -> Vec<CompletionItem> {
    index
        .all_names(kind)
        .into_iter()
        .filter_map(|name| {
            let decl = index.lookup(kind, &name)?;
            let detail = index.file_path(decl.location().file).map(str::to_string);
            let item = CompletionItem::new(name, decl);
            Some(match detail {
                Some(path) => item.with_detail(path),
                None => item,
            })
        })
        .collect()
}

fn service_items(services: &ServiceGraph) -> Vec<CompletionItem> {
    services
        .service_ids()
        .into_iter()
        .filter_map(|id| {
            let service = services.service(id)?;
            if service.is_abstract {
                return None;
            }
            let item = CompletionItem::new(id, Declaration::Service(service.clone()));
            Some(match services.get_service_class(id) {
                Some(class) => item.with_detail(class),
                None => item,
            })
        })
        .collect()
}

/// `Class::method` for every public, non-static method.
fn controller_items(index: &ProjectIndex) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for decl in index.declarations_of_kind(DeclKind::Class) {
        let Declaration::Class(class) = decl else {
            continue;
        };
        if class.is_interface || class.is_abstract {
            continue;
        }
        for (position, method) in class.methods.iter().enumerate() {
            if !method.is_public() || method.is_static || method.name.starts_with("__") {
                continue;
            }
            let priority = if method.has_route { 10 } else { 100 };
            items.push(
                CompletionItem::new(
                    format!("{}::{}", class.fqn, method.name),
                    Declaration::Method {
                        class: class.clone(),
                        index: position,
                    },
                )
                .with_priority(priority),
            );
        }
    }
    items
}
