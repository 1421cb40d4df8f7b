//! Diagnostics — missing-method detection for method references.
//!
//! Every [`ReferenceSite`] names a method on some owning class. The
//! [`MethodReferenceChecker`] resolves the owner, looks the method up
//! through the class hierarchy and, when it is absent, reports a
//! "Missing Method" warning carrying a [`FixAction`] that creates it.

use std::sync::Arc;

use crate::base::{FileId, SourceRange, TextRange};

use super::collector::ServiceGraph;
use super::config::AnalysisConfig;
use super::declarations::{ClassDeclaration, ImportTable, short_name};
use super::extract::{ReferenceSite, SiteOrigin, SiteOwner};
use super::hierarchy::{MethodLookup, is_subclass_of, lookup_class};
use super::index::ProjectIndex;
use super::resolve::Resolver;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A fix that creates a missing method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateMethodFix {
    /// Fully-qualified class receiving the method.
    pub class: String,
    pub class_location: SourceRange,
    pub method: String,
    /// Fully-qualified parameter types, joined as a union in the stub.
    pub parameter_types: Vec<String>,
    /// Classes the stub needs imported into the class's file.
    pub imports: Vec<String>,
    /// Source text of the method.
    pub stub: String,
}

/// An edit the host may apply to resolve a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FixAction {
    CreateMethod(CreateMethodFix),
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    /// Warning code (e.g., "W0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub fix: Option<FixAction>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub location: SourceRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(location: SourceRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            file: location.file,
            range: location.range,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            fix: None,
            related: Vec::new(),
        }
    }

    /// Set the warning code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_fix(mut self, fix: FixAction) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn location(&self) -> SourceRange {
        SourceRange::new(self.file, self.range)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
pub mod codes {
    /// A referenced method does not exist on its class.
    pub const MISSING_METHOD: &str = "W0001";
}

/// Message of a missing-method warning.
pub const MISSING_METHOD_MESSAGE: &str = "Missing Method";

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during checking.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a missing-method warning with its fix.
    pub fn missing_method(&mut self, site: &ReferenceSite, class: &ClassDeclaration, fix: CreateMethodFix) {
        self.add(
            Diagnostic::warning(site.range, MISSING_METHOD_MESSAGE)
                .with_code(codes::MISSING_METHOD)
                .with_related(RelatedInfo {
                    location: class.location,
                    message: Arc::from(format!("class {}", class.fqn)),
                })
                .with_fix(FixAction::CreateMethod(fix)),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics sorted by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.file, d.range.start(), d.range.end()));
        self.diagnostics
    }
}

// ============================================================================
// METHOD REFERENCE CHECKER
// ============================================================================

/// Validates method reference sites against their owning classes.
pub struct MethodReferenceChecker<'a> {
    index: &'a ProjectIndex,
    services: &'a ServiceGraph,
    config: &'a AnalysisConfig,
    collector: DiagnosticCollector,
}

impl<'a> MethodReferenceChecker<'a> {
    pub fn new(
        index: &'a ProjectIndex,
        services: &'a ServiceGraph,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            index,
            services,
            config,
            collector: DiagnosticCollector::new(),
        }
    }

    /// Check every reference site in a file.
    pub fn check_file(&mut self, file: FileId) {
        for site in self.index.sites_in_file(file) {
            self.check_site(site);
        }
    }

    /// Check one reference site.
    pub fn check_site(&mut self, site: &ReferenceSite) {
        let resolver = Resolver::new(self.index, self.services, self.config);

        let class = match site.owner {
            SiteOwner::ClassValue(ref value) => resolver.resolve_class_value(value),
            SiteOwner::Class(ref fqn) => lookup_class(self.index, fqn),
        };
        // An unknown owner cannot be validated.
        let Some(class) = class else {
            return;
        };

        if site.origin == SiteOrigin::SubscribedEvents
            && !is_subclass_of(
                self.index,
                &class.fqn,
                &self.config.subscriber_interface,
                self.config.max_chain_hops,
            )
        {
            return;
        }

        match resolver.find_method(&class, &site.method) {
            MethodLookup::Found(_) | MethodLookup::Unknown => {}
            MethodLookup::Missing => {
                let fix = self.create_method_fix(site, &class);
                self.collector.missing_method(site, &class, fix);
            }
        }
    }

    fn create_method_fix(&self, site: &ReferenceSite, class: &ClassDeclaration) -> CreateMethodFix {
        let parameter_types: Vec<String> = match site.event {
            Some(ref event) => self
                .services
                .get_tagged_method_parameter_types(self.index, self.config, event)
                .into_iter()
                .collect(),
            None => Vec::new(),
        };

        let default_imports = ImportTable::default();
        let imports_table = self
            .index
            .import_table(class.location.file)
            .unwrap_or(&default_imports);
        let mut imports = Vec::new();
        let names: Vec<String> = parameter_types
            .iter()
            .map(|fqn| type_reference(imports_table, class, fqn, &mut imports))
            .collect();

        let parameters = if names.is_empty() {
            String::new()
        } else {
            format!(
                "{} {}",
                names.join(&self.config.union_separator),
                self.config.stub_parameter_name
            )
        };

        CreateMethodFix {
            class: class.fqn.clone(),
            class_location: class.location,
            method: site.method.clone(),
            parameter_types,
            imports,
            stub: format!("public function {}({})\n{{\n}}\n", site.method, parameters),
        }
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.collector.finish()
    }
}

/// How `fqn` is written in the class's file, recording a `use` import when
/// one is needed.
fn type_reference(
    table: &ImportTable,
    class: &ClassDeclaration,
    fqn: &str,
    imports: &mut Vec<String>,
) -> String {
    if let Some(name) = table.visible_name_of(fqn) {
        return name;
    }
    let short = short_name(fqn);
    let clashes = table
        .aliases
        .keys()
        .any(|alias| alias.eq_ignore_ascii_case(short))
        || class.short_name().eq_ignore_ascii_case(short)
        || imports
            .iter()
            .any(|i| short_name(i).eq_ignore_ascii_case(short) && !i.eq_ignore_ascii_case(fqn));
    if clashes {
        return format!("\\{}", fqn);
    }
    if !imports.iter().any(|i| i.eq_ignore_ascii_case(fqn)) {
        imports.push(fqn.to_string());
    }
    short.to_string()
}

/// Check all method references in a file.
pub fn check_file(
    index: &ProjectIndex,
    services: &ServiceGraph,
    config: &AnalysisConfig,
    file: FileId,
) -> Vec<Diagnostic> {
    let mut checker = MethodReferenceChecker::new(index, services, config);
    checker.check_file(file);
    checker.finish()
}
