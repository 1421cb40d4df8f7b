//! Reference resolution.
//!
//! Maps free text written in a configuration file, a template or PHP code
//! to the declarations it names. Unknown references are a normal outcome
//! and come back as [`ResolveResult::NotFound`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::base::FileId;
use crate::syntax::trim_quotes;

use super::blocks::{blocks_visible_at, template_of_file};
use super::collector::{ServiceGraph, expand_parameters};
use super::config::AnalysisConfig;
use super::declarations::{ClassDeclaration, DeclKind, Declaration, looks_like_class};
use super::extract::split_controller;
use super::hierarchy::{MethodLookup, find_method, lookup_class};
use super::index::ProjectIndex;

// ============================================================================
// REFERENCE KINDS
// ============================================================================

/// What a piece of reference text is expected to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    ClassName,
    ServiceId,
    EventName,
    /// `Class::method`, `service:method` or an invokable class.
    Controller,
    BlockName,
    RouteName,
    Parameter,
    Template,
}

impl ReferenceKind {
    /// Declaration kinds a resolution of this kind reads.
    pub fn dependencies(&self) -> &'static [DeclKind] {
        match self {
            ReferenceKind::ClassName => &[DeclKind::Class],
            ReferenceKind::ServiceId => &[DeclKind::Service, DeclKind::Parameter, DeclKind::Class],
            ReferenceKind::EventName => &[DeclKind::EventSubscription],
            ReferenceKind::Controller => &[DeclKind::Class, DeclKind::Service, DeclKind::Parameter],
            ReferenceKind::BlockName => &[DeclKind::TemplateBlock, DeclKind::Template],
            ReferenceKind::RouteName => &[DeclKind::Route],
            ReferenceKind::Parameter => &[DeclKind::Parameter],
            ReferenceKind::Template => &[DeclKind::Template],
        }
    }

    /// Declaration kind whose names complete this reference kind.
    pub fn decl_kind(&self) -> DeclKind {
        match self {
            ReferenceKind::ClassName | ReferenceKind::Controller => DeclKind::Class,
            ReferenceKind::ServiceId => DeclKind::Service,
            ReferenceKind::EventName => DeclKind::EventSubscription,
            ReferenceKind::BlockName => DeclKind::TemplateBlock,
            ReferenceKind::RouteName => DeclKind::Route,
            ReferenceKind::Parameter => DeclKind::Parameter,
            ReferenceKind::Template => DeclKind::Template,
        }
    }
}

// ============================================================================
// RESOLVE RESULT
// ============================================================================

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Successfully resolved to a single declaration.
    Found(Declaration),
    /// Resolved to several declarations, in stable order.
    Ambiguous(Vec<Declaration>),
    /// Could not resolve the reference.
    NotFound,
}

impl ResolveResult {
    pub fn from_vec(mut declarations: Vec<Declaration>) -> Self {
        match declarations.len() {
            0 => ResolveResult::NotFound,
            1 => declarations
                .pop()
                .map_or(ResolveResult::NotFound, ResolveResult::Found),
            _ => ResolveResult::Ambiguous(declarations),
        }
    }

    /// Get the resolved declaration if unambiguous.
    pub fn declaration(&self) -> Option<&Declaration> {
        match self {
            ResolveResult::Found(d) => Some(d),
            _ => None,
        }
    }

    /// Every resolved declaration.
    pub fn declarations(&self) -> Vec<Declaration> {
        match self {
            ResolveResult::Found(d) => vec![d.clone()],
            ResolveResult::Ambiguous(all) => all.clone(),
            ResolveResult::NotFound => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolveResult::NotFound)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver over one index snapshot and its service graph.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    index: &'a ProjectIndex,
    services: &'a ServiceGraph,
    config: &'a AnalysisConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a ProjectIndex,
        services: &'a ServiceGraph,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            index,
            services,
            config,
        }
    }

    /// Resolve `text` as a reference of `kind` written in `context`.
    ///
    /// Surrounding quotes and whitespace are stripped first; blank text is
    /// never looked up.
    pub fn resolve(&self, kind: ReferenceKind, text: &str, context: Option<FileId>) -> ResolveResult {
        let text = trim_quotes(text);
        if text.is_empty() {
            return ResolveResult::NotFound;
        }
        let found: Vec<Declaration> = match kind {
            ReferenceKind::ClassName => self
                .resolve_class(text, context)
                .map(Declaration::Class)
                .into_iter()
                .collect(),
            ReferenceKind::ServiceId => self.resolve_service(text),
            ReferenceKind::EventName => self.index.query(DeclKind::EventSubscription, text),
            ReferenceKind::Controller => self.resolve_controller(text, context),
            ReferenceKind::BlockName => self.resolve_block(text, context),
            ReferenceKind::RouteName => self.index.query(DeclKind::Route, text),
            ReferenceKind::Parameter => self.index.query(DeclKind::Parameter, text.trim_matches('%')),
            ReferenceKind::Template => self.index.query(DeclKind::Template, text),
        };
        ResolveResult::from_vec(found)
    }

    /// Class named `name` as written in `context`.
    ///
    /// Tries the file's `use` aliases and namespace first, then the name as
    /// fully qualified.
    pub fn resolve_class(&self, name: &str, context: Option<FileId>) -> Option<Arc<ClassDeclaration>> {
        let name = trim_quotes(name);
        if name.is_empty() {
            return None;
        }
        if !name.starts_with('\\') {
            if let Some(imports) = context.and_then(|f| self.index.import_table(f)) {
                let qualified = imports.resolve_to_fqn(name);
                if let Some(class) = lookup_class(self.index, &qualified) {
                    return Some(class);
                }
            }
        }
        lookup_class(self.index, name.trim_start_matches('\\'))
    }

    /// Fully-qualified class a configuration class value stands for.
    ///
    /// The value may be a `%parameter%`, a declared class, or a service id
    /// whose effective class is taken from the service graph. Class-like
    /// text is returned even when no such class is indexed.
    pub fn class_value_fqn(&self, value: &str) -> Option<String> {
        let value = expand_parameters(self.index, trim_quotes(value), self.config.max_chain_hops)?;
        let value = value.trim_start_matches('@');
        if value.is_empty() {
            return None;
        }
        if let Some(class) = lookup_class(self.index, value.trim_start_matches('\\')) {
            return Some(class.fqn.clone());
        }
        if let Some(class) = self.services.get_service_class(value) {
            return Some(class.to_string());
        }
        if looks_like_class(value) {
            return Some(value.trim_start_matches('\\').to_string());
        }
        None
    }

    /// Indexed class a configuration class value stands for.
    pub fn resolve_class_value(&self, value: &str) -> Option<Arc<ClassDeclaration>> {
        lookup_class(self.index, &self.class_value_fqn(value)?)
    }

    /// Look `method` up on `class` and its ancestors.
    pub fn find_method(&self, class: &Arc<ClassDeclaration>, method: &str) -> MethodLookup {
        find_method(self.index, class, method, self.config.max_chain_hops)
    }

    fn resolve_service(&self, text: &str) -> Vec<Declaration> {
        let id = text.trim_start_matches('@').trim_start_matches('?');
        if let Some(service) = self.services.service(id) {
            return vec![Declaration::Service(service.clone())];
        }
        if self.services.is_service_class(id) {
            if let Some(class) = lookup_class(self.index, id) {
                return vec![Declaration::Class(class)];
            }
        }
        Vec::new()
    }

    fn resolve_controller(&self, text: &str, context: Option<FileId>) -> Vec<Declaration> {
        match split_controller(text) {
            Some((owner, method, _)) => {
                let class = self
                    .resolve_class(owner, context)
                    .or_else(|| self.resolve_class_value(owner));
                class
                    .and_then(|c| self.find_method(&c, method.trim()).found())
                    .into_iter()
                    .collect()
            }
            None => {
                let Some(class) = self.resolve_class_value(text) else {
                    return Vec::new();
                };
                match self.find_method(&class, "__invoke").found() {
                    Some(invoke) => vec![invoke],
                    None => vec![Declaration::Class(class)],
                }
            }
        }
    }

    fn resolve_block(&self, name: &str, context: Option<FileId>) -> Vec<Declaration> {
        if let Some(template) = context.and_then(|f| template_of_file(self.index, f)) {
            let visible =
                blocks_visible_at(self.index, &template.path, self.config, &CancellationToken::new())
                    .unwrap_or_default();
            if let Some(block) = visible.into_iter().find(|b| b.name == name) {
                return block.all.into_iter().map(Declaration::Block).collect();
            }
        }
        self.index.query(DeclKind::TemplateBlock, name)
    }
}
