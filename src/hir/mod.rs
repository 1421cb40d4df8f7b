//! High-level IR (HIR) — declarations, the project index and queries over it.
//!
//! Per-file extraction turns host syntax trees into declarations and
//! reference sites. The [`ProjectIndex`] stores them partitioned by file and
//! stamps every commit with a generation, so derived views can be cached and
//! invalidated precisely.
//!
//! ## Key Types
//!
//! - [`Declaration`] — Anything a reference can resolve to
//! - [`ProjectIndex`] — Generation-stamped `(kind, name)` index
//! - [`Resolver`] — Reference text → declarations
//! - [`ServiceGraph`] / [`LazyServiceCollector`] — Resolved container graph
//! - [`MethodReferenceChecker`] — "Missing Method" validation
//!
//! ## Query Layers
//!
//! ```text
//! extract(file, tree)        ← per-file declarations + reference sites
//!     │
//!     ▼
//! ProjectIndex               ← (kind, name) buckets, file generations
//!     │
//!     ├──► ServiceGraph      ← effective classes, tag index (once per revision)
//!     ├──► blocks_visible_at ← template inheritance walk
//!     ▼
//! Resolver                   ← resolve(kind, text, context)
//!     │
//!     ▼
//! check_file(file)           ← missing-method diagnostics
//! ```

mod blocks;
mod collector;
mod config;
mod declarations;
mod diagnostics;
mod extract;
mod hierarchy;
mod index;
mod resolve;
mod usage;

pub use blocks::{VisibleBlock, blocks_visible_at, by_global_name, template_of_file};
pub use collector::{LazyServiceCollector, ServiceGraph, expand_parameters};
pub use config::AnalysisConfig;
pub use declarations::{
    ClassDeclaration, DeclKind, Declaration, EventSubscription, FileDeclarations, ImportTable,
    MethodDeclaration, ParameterDeclaration, ParameterInfo, Prototype, RouteDeclaration,
    ServiceDeclaration, ServiceTag, SubscriptionOrigin, TemplateBlockDeclaration,
    TemplateDeclaration, TemplateLink, listener_method_name, looks_like_class, short_name,
};
pub use diagnostics::{
    CreateMethodFix, Diagnostic, DiagnosticCollector, FixAction, MISSING_METHOD_MESSAGE,
    MethodReferenceChecker, RelatedInfo, Severity, check_file, codes,
};
pub use extract::{ReferenceSite, SiteOrigin, SiteOwner, default_route_name, extract};
pub use hierarchy::{MethodLookup, find_method, is_subclass_of, lookup_class};
pub use index::{Dependencies, Dependency, ProjectIndex, Tracked};
pub use resolve::{ReferenceKind, ResolveResult, Resolver};
pub use usage::{is_class_implicitly_used, is_method_implicitly_used};
