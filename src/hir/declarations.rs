//! Declarations — the uniform model every extractor produces.
//!
//! Declarations are immutable once extracted. A file's declarations are
//! replaced wholesale whenever the file changes, so they are shared as
//! `Arc`s between the index, snapshots and query results.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::SourceRange;
use crate::syntax::Visibility;

use super::extract::ReferenceSite;

// ============================================================================
// KINDS
// ============================================================================

/// The kind a declaration is indexed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    Service,
    Parameter,
    Route,
    EventSubscription,
    TemplateBlock,
    Template,
    Class,
}

impl DeclKind {
    pub const COUNT: usize = 7;

    pub const ALL: [DeclKind; DeclKind::COUNT] = [
        DeclKind::Service,
        DeclKind::Parameter,
        DeclKind::Route,
        DeclKind::EventSubscription,
        DeclKind::TemplateBlock,
        DeclKind::Template,
        DeclKind::Class,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeclKind::Service => "service",
            DeclKind::Parameter => "parameter",
            DeclKind::Route => "route",
            DeclKind::EventSubscription => "event",
            DeclKind::TemplateBlock => "block",
            DeclKind::Template => "template",
            DeclKind::Class => "class",
        }
    }

    /// Key a name is indexed under. Class names are case-insensitive.
    pub(crate) fn index_key(self, name: &str) -> SmolStr {
        match self {
            DeclKind::Class => SmolStr::new(name.trim_start_matches('\\').to_ascii_lowercase()),
            _ => SmolStr::new(name),
        }
    }
}

// ============================================================================
// SERVICES
// ============================================================================

/// A tag attached to a service definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTag {
    pub name: String,
    pub attributes: IndexMap<String, String>,
}

impl ServiceTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A `resource`-based registration of every class under a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prototype {
    pub namespace: String,
    pub resource: Option<String>,
    /// Merged `exclude` attribute and `<exclude>` children. Never blank.
    pub exclude: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDeclaration {
    pub id: String,
    /// Class value as written; may be a `%parameter%` reference.
    pub class: Option<String>,
    pub parent_id: Option<String>,
    pub alias: Option<String>,
    pub tags: Vec<ServiceTag>,
    pub is_abstract: bool,
    pub is_synthetic: bool,
    pub prototype: Option<Prototype>,
    pub location: SourceRange,
}

impl ServiceDeclaration {
    pub fn new(id: impl Into<String>, location: SourceRange) -> Self {
        Self {
            id: id.into(),
            class: None,
            parent_id: None,
            alias: None,
            tags: Vec::new(),
            is_abstract: false,
            is_synthetic: false,
            prototype: None,
            location,
        }
    }

    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ServiceTag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub name: String,
    pub value: Option<String>,
    pub location: SourceRange,
}

// ============================================================================
// ROUTES AND EVENTS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDeclaration {
    pub name: String,
    /// `Class::method`, `service:method` or an invokable class.
    pub controller: Option<String>,
    pub path: Option<String>,
    pub location: SourceRange,
}

/// Where an event subscription was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionOrigin {
    /// `#[AsEventListener]` on a class or method.
    AttributeDeclared,
    /// An entry of `getSubscribedEvents()`.
    InterfaceImplemented,
    /// A service tag carrying an `event` attribute.
    TagDeclared,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSubscription {
    pub event_name: String,
    pub method_name: String,
    pub priority: i64,
    /// Class reference as written; resolved lazily and never owned.
    pub owning_class: String,
    pub origin: SubscriptionOrigin,
    pub location: SourceRange,
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateBlockDeclaration {
    pub name: String,
    pub template_path: String,
    pub location: SourceRange,
    /// The owning template extends or uses another template. Whether this
    /// block actually overrides one is [`crate::hir::VisibleBlock::overrides_parent`].
    pub has_parent_template: bool,
}

/// A reference from one template to another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateLink {
    pub name: String,
    pub location: SourceRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDeclaration {
    pub path: String,
    pub extends: Vec<TemplateLink>,
    pub embeds: Vec<TemplateLink>,
    pub uses: Vec<TemplateLink>,
    pub includes: Vec<TemplateLink>,
    pub location: SourceRange,
}

// ============================================================================
// CLASSES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    /// Fully-qualified type names; several for a union type.
    pub types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<ParameterInfo>,
    /// Carries a recognized route annotation or attribute.
    pub has_route: bool,
    pub location: SourceRange,
}

impl MethodDeclaration {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDeclaration {
    pub fqn: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub methods: Vec<MethodDeclaration>,
    pub location: SourceRange,
}

impl ClassDeclaration {
    /// Own method by name, compared case-insensitively.
    pub fn method(&self, name: &str) -> Option<(usize, &MethodDeclaration)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, m)| m.name.eq_ignore_ascii_case(name))
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.fqn)
    }

    pub fn namespace(&self) -> &str {
        match self.fqn.rfind('\\') {
            Some(i) => &self.fqn[..i],
            None => "",
        }
    }
}

// ============================================================================
// DECLARATION
// ============================================================================

/// Any declaration the index stores or a resolution yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    Service(Arc<ServiceDeclaration>),
    Parameter(Arc<ParameterDeclaration>),
    Route(Arc<RouteDeclaration>),
    Event(Arc<EventSubscription>),
    Block(Arc<TemplateBlockDeclaration>),
    Template(Arc<TemplateDeclaration>),
    Class(Arc<ClassDeclaration>),
    /// A method of a class. Only produced by resolution.
    Method {
        class: Arc<ClassDeclaration>,
        index: usize,
    },
}

impl Declaration {
    /// Kind the declaration is indexed under, `None` for methods.
    pub fn kind(&self) -> Option<DeclKind> {
        match self {
            Declaration::Service(_) => Some(DeclKind::Service),
            Declaration::Parameter(_) => Some(DeclKind::Parameter),
            Declaration::Route(_) => Some(DeclKind::Route),
            Declaration::Event(_) => Some(DeclKind::EventSubscription),
            Declaration::Block(_) => Some(DeclKind::TemplateBlock),
            Declaration::Template(_) => Some(DeclKind::Template),
            Declaration::Class(_) => Some(DeclKind::Class),
            Declaration::Method { .. } => None,
        }
    }

    /// Name the declaration is looked up by.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Service(s) => &s.id,
            Declaration::Parameter(p) => &p.name,
            Declaration::Route(r) => &r.name,
            Declaration::Event(e) => &e.event_name,
            Declaration::Block(b) => &b.name,
            Declaration::Template(t) => &t.path,
            Declaration::Class(c) => &c.fqn,
            Declaration::Method { class, index } => class
                .methods
                .get(*index)
                .map(|m| m.name.as_str())
                .unwrap_or_default(),
        }
    }

    pub fn location(&self) -> SourceRange {
        match self {
            Declaration::Service(s) => s.location,
            Declaration::Parameter(p) => p.location,
            Declaration::Route(r) => r.location,
            Declaration::Event(e) => e.location,
            Declaration::Block(b) => b.location,
            Declaration::Template(t) => t.location,
            Declaration::Class(c) => c.location,
            Declaration::Method { class, index } => class
                .methods
                .get(*index)
                .map(|m| m.location)
                .unwrap_or(class.location),
        }
    }

    pub fn as_service(&self) -> Option<&Arc<ServiceDeclaration>> {
        match self {
            Declaration::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassDeclaration>> {
        match self {
            Declaration::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Arc<TemplateBlockDeclaration>> {
        match self {
            Declaration::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&Arc<TemplateDeclaration>> {
        match self {
            Declaration::Template(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<(&Arc<ClassDeclaration>, &MethodDeclaration)> {
        match self {
            Declaration::Method { class, index } => class.methods.get(*index).map(|m| (class, m)),
            _ => None,
        }
    }
}

// ============================================================================
// PER-FILE OUTPUT
// ============================================================================

/// Namespace and `use` aliases of a PHP file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportTable {
    pub namespace: Option<String>,
    /// Visible name → fully-qualified name.
    pub aliases: FxHashMap<String, String>,
}

impl ImportTable {
    /// Expand a class name written in this file to its fully-qualified form.
    pub fn resolve_to_fqn(&self, name: &str) -> String {
        if let Some(fqn) = name.strip_prefix('\\') {
            return fqn.to_string();
        }
        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.aliases.get(first) {
            return match rest {
                Some(rest) => format!("{}\\{}", target, rest),
                None => target.clone(),
            };
        }
        match self.namespace {
            Some(ref ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
            _ => name.to_string(),
        }
    }

    /// Name under which `fqn` is visible in this file without a new import.
    pub fn visible_name_of(&self, fqn: &str) -> Option<String> {
        if let Some((alias, _)) = self
            .aliases
            .iter()
            .filter(|(_, target)| target.eq_ignore_ascii_case(fqn))
            .min_by(|a, b| a.0.cmp(b.0))
        {
            return Some(alias.clone());
        }
        let namespace = self.namespace.as_deref().unwrap_or("");
        let (class_ns, short) = match fqn.rfind('\\') {
            Some(i) => (&fqn[..i], &fqn[i + 1..]),
            None => ("", fqn),
        };
        // An import of the same short name shadows the namespace sibling.
        let shadowed = self.aliases.keys().any(|alias| alias.eq_ignore_ascii_case(short));
        if class_ns.eq_ignore_ascii_case(namespace) && !shadowed {
            Some(short.to_string())
        } else {
            None
        }
    }
}

/// Everything extracted from one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileDeclarations {
    pub declarations: Vec<Declaration>,
    pub sites: Vec<ReferenceSite>,
    pub imports: ImportTable,
}

impl FileDeclarations {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.sites.is_empty()
    }
}

// ============================================================================
// NAME HELPERS
// ============================================================================

/// Last segment of a namespaced class name.
pub fn short_name(fqn: &str) -> &str {
    fqn.rsplit('\\').next().unwrap_or(fqn)
}

/// Whether a service id is written like a class name.
pub fn looks_like_class(id: &str) -> bool {
    let id = id.trim_start_matches('\\');
    let Some(first) = id.chars().next() else {
        return false;
    };
    if id.contains('\\') {
        return id
            .split('\\')
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }
    first.is_ascii_uppercase() && id.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Default listener method for an event: `on` followed by the camelized name.
pub fn listener_method_name(event: &str) -> String {
    let mut out = String::from("on");
    let mut prev: Option<char> = None;
    for c in event.chars() {
        let boundary = match prev {
            None => true,
            Some(p) => p == '_' || !(p.is_alphanumeric() || p == '_'),
        };
        if c.is_alphanumeric() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
        }
        prev = Some(c);
    }
    out
}
