//! AnalysisHost and Analysis — project state and consistent snapshots.
//!
//! The `AnalysisHost` owns the committed [`ProjectIndex`] and hands out
//! `Analysis` snapshots for querying. Writers extract outside the lock and
//! commit one file at a time; a snapshot keeps answering from the revision
//! it was taken at while newer commits land.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new();
//!
//! // Apply file changes
//! let file = host.set_file_content("config/services.yaml", text)?;
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! let diagnostics = analysis.validate(file);
//! let targets = analysis.targets_for(ReferenceKind::ServiceId, "app.mailer", None);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::base::{FileId, SourceRange};
use crate::hir::{
    AnalysisConfig, DeclKind, Dependencies, Diagnostic, FileDeclarations, LazyServiceCollector,
    ProjectIndex, ReferenceKind, ResolveResult, Resolver, ServiceGraph, Tracked, VisibleBlock,
    blocks_visible_at, by_global_name, check_file, extract, is_class_implicitly_used,
    is_method_implicitly_used, template_of_file,
};
use crate::syntax::{ReadError, SyntaxFile, SyntaxKind, read_file};

use super::{
    CompletionItem, GotoResult, ReferenceResult, SymbolInfo, document_symbols,
    find_block_declarations, find_method_references, lookup_elements_for, targets_for,
    workspace_symbols,
};

type ResolveKey = (ReferenceKind, String, Option<FileId>);

/// Resolved entries kept before stale ones are evicted on insert.
const RESOLVED_CAPACITY: usize = 4096;

/// Derived results shared by every snapshot of one host.
///
/// Each entry carries the counters it was computed from. An entry built
/// from an older snapshot never replaces one built from a newer snapshot.
#[derive(Debug, Default)]
struct QueryCaches {
    services: LazyServiceCollector,
    names: Mutex<FxHashMap<DeclKind, Tracked<Arc<BTreeSet<String>>>>>,
    resolved: Mutex<FxHashMap<ResolveKey, Tracked<ResolveResult>>>,
}

impl QueryCaches {
    /// Drop every entry no longer current against `index`.
    fn evict_stale(&self, index: &ProjectIndex) {
        let mut resolved = self.resolved.lock();
        let before = resolved.len();
        resolved.retain(|_, e| e.is_current(index));
        self.names.lock().retain(|_, e| e.is_current(index));
        trace!(evicted = before - resolved.len(), "resolve cache eviction");
    }

    fn store_resolved(&self, index: &ProjectIndex, key: ResolveKey, entry: Tracked<ResolveResult>) {
        {
            let mut resolved = self.resolved.lock();
            if resolved.len() >= RESOLVED_CAPACITY && !resolved.contains_key(&key) {
                resolved.retain(|_, e| e.is_current(index));
                if resolved.len() >= RESOLVED_CAPACITY {
                    resolved.clear();
                }
            }
        }
        store(&self.resolved, key, entry);
    }
}

fn store<K: std::hash::Hash + Eq, V>(
    cache: &Mutex<FxHashMap<K, Tracked<V>>>,
    key: K,
    entry: Tracked<V>,
) {
    let mut cache = cache.lock();
    let newer_cached = cache
        .get(&key)
        .is_some_and(|e| e.dependencies.revision() > entry.dependencies.revision());
    if !newer_cached {
        cache.insert(key, entry);
    }
}

/// Path ↔ FileId registry. Ids are never reused.
#[derive(Debug, Default)]
struct FileRegistry {
    by_path: FxHashMap<String, FileId>,
    paths: Vec<String>,
}

impl FileRegistry {
    fn intern(&mut self, path: &str) -> FileId {
        if let Some(&file) = self.by_path.get(path) {
            return file;
        }
        let file = FileId::new(self.paths.len() as u32);
        self.paths.push(path.to_string());
        self.by_path.insert(path.to_string(), file);
        file
    }
}

/// Owns all project state.
///
/// Cloning yields another handle to the same project. Apply changes via
/// `set_file()`, `set_file_content()` and `remove_file()`, then get a
/// consistent snapshot via `analysis()`.
#[derive(Clone, Debug)]
pub struct AnalysisHost {
    index: Arc<RwLock<Arc<ProjectIndex>>>,
    files: Arc<RwLock<FileRegistry>>,
    caches: Arc<QueryCaches>,
    config: Arc<AnalysisConfig>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a new empty host with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            index: Arc::new(RwLock::new(Arc::new(ProjectIndex::new()))),
            files: Arc::new(RwLock::new(FileRegistry::default())),
            caches: Arc::new(QueryCaches::default()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Update or add a file from a host-supplied syntax tree.
    pub fn set_file(&self, path: &str, syntax: &SyntaxFile) -> FileId {
        let file = self.files.write().intern(path);
        let declarations = extract(file, path, syntax);
        self.commit(vec![(file, path.to_string(), declarations)]);
        file
    }

    /// Read `text` as the syntax its path implies, then index it.
    ///
    /// On a read error the file keeps the declarations of its last
    /// successful read (or contributes nothing if it was never read).
    pub fn set_file_content(&self, path: &str, text: &str) -> Result<FileId, ReadError> {
        let syntax = read_path(path, text).inspect_err(|err| {
            warn!(path, error = %err, "failed to read file, keeping previous version");
        })?;
        Ok(self.set_file(path, &syntax))
    }

    /// Index many files. Extraction runs in parallel; commits are serial.
    pub fn load_files(&self, files: Vec<(String, SyntaxFile)>) -> Vec<FileId> {
        let ids: Vec<FileId> = {
            let mut registry = self.files.write();
            files.iter().map(|(path, _)| registry.intern(path)).collect()
        };
        let extracted: Vec<(FileId, String, FileDeclarations)> = files
            .par_iter()
            .zip(ids.par_iter())
            .map(|((path, syntax), &file)| (file, path.clone(), extract(file, path, syntax)))
            .collect();
        self.commit(extracted);
        ids
    }

    /// Read and index many files. Returns the read failures by path.
    pub fn load_file_contents(&self, files: Vec<(String, String)>) -> Vec<(String, ReadError)> {
        let (read, failed): (Vec<_>, Vec<_>) = files
            .into_par_iter()
            .map(|(path, text)| match read_path(&path, &text) {
                Ok(syntax) => Ok((path, syntax)),
                Err(err) => Err((path, err)),
            })
            .partition(Result::is_ok);
        self.load_files(read.into_iter().flatten().collect());

        let failed: Vec<(String, ReadError)> =
            failed.into_iter().filter_map(Result::err).collect();
        for (path, err) in &failed {
            warn!(path = path.as_str(), error = %err, "failed to read file");
        }
        failed
    }

    /// Remove a file. Returns false if it was not indexed.
    pub fn remove_file(&self, path: &str) -> bool {
        let Some(file) = self.file_id(path) else {
            return false;
        };
        let mut guard = self.index.write();
        let index = Arc::make_mut(&mut *guard);
        let removed = index.invalidate(file);
        if removed {
            self.caches.evict_stale(index);
        }
        removed
    }

    /// Get the FileId for a path, if it was ever seen.
    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.files.read().by_path.get(path).copied()
    }

    pub fn file_path(&self, file: FileId) -> Option<String> {
        self.files.read().paths.get(file.index() as usize).cloned()
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis {
        Analysis {
            index: self.index.read().clone(),
            caches: self.caches.clone(),
            config: self.config.clone(),
        }
    }

    fn commit(&self, batch: Vec<(FileId, String, FileDeclarations)>) {
        let mut guard = self.index.write();
        let index = Arc::make_mut(&mut *guard);
        for (file, path, declarations) in batch {
            index.put(file, &path, declarations);
        }
        debug!(revision = index.revision(), files = index.file_count(), "committed");
        self.caches.evict_stale(index);
    }
}

fn read_path(path: &str, text: &str) -> Result<SyntaxFile, ReadError> {
    match SyntaxKind::from_path(path) {
        Some(kind) => read_file(kind, text),
        None => Err(ReadError::Unsupported("unknown")),
    }
}

/// An immutable snapshot of the project.
///
/// All queries go through this struct to ensure consistent results.
#[derive(Clone, Debug)]
pub struct Analysis {
    index: Arc<ProjectIndex>,
    caches: Arc<QueryCaches>,
    config: Arc<AnalysisConfig>,
}

impl Analysis {
    // ==================== Resolution ====================

    /// The service graph for this snapshot, built on first use.
    pub fn service_graph(&self) -> Arc<ServiceGraph> {
        self.service_graph_cancellable(&CancellationToken::new())
            .unwrap_or_default()
    }

    /// Like [`Analysis::service_graph`], but `None` if `cancel` fires first.
    pub fn service_graph_cancellable(&self, cancel: &CancellationToken) -> Option<Arc<ServiceGraph>> {
        self.caches.services.get(&self.index, &self.config, cancel)
    }

    /// Resolve reference text. Results are memoized per snapshot counters.
    pub fn resolve(&self, kind: ReferenceKind, text: &str, context: Option<FileId>) -> ResolveResult {
        let key = (kind, text.to_string(), context);
        if let Some(entry) = self.caches.resolved.lock().get(&key) {
            if entry.is_current(&self.index) {
                trace!(?kind, text, "resolve cache hit");
                return entry.value.clone();
            }
        }

        let mut dependencies = Dependencies::on_kinds(&self.index, kind.dependencies());
        if let Some(file) = context {
            dependencies = dependencies.with_file(&self.index, file);
        }
        let graph = self.service_graph();
        let result = Resolver::new(&self.index, &graph, &self.config).resolve(kind, text, context);
        self.caches
            .store_resolved(&self.index, key, Tracked::new(result.clone(), dependencies));
        result
    }

    /// Locations of the declarations `text` refers to.
    pub fn targets_for(&self, kind: ReferenceKind, text: &str, context: Option<FileId>) -> GotoResult {
        let graph = self.service_graph();
        targets_for(&Resolver::new(&self.index, &graph, &self.config), kind, text, context)
    }

    /// Completion candidates for a reference of `kind`.
    pub fn lookup_elements_for(&self, kind: ReferenceKind, context: Option<FileId>) -> Vec<CompletionItem> {
        self.lookup_elements_cancellable(kind, context, &CancellationToken::new())
            .unwrap_or_default()
    }

    pub fn lookup_elements_cancellable(
        &self,
        kind: ReferenceKind,
        context: Option<FileId>,
        cancel: &CancellationToken,
    ) -> Option<Vec<CompletionItem>> {
        let graph = self.service_graph_cancellable(cancel)?;
        lookup_elements_for(&self.index, &graph, &self.config, kind, context, cancel)
    }

    // ==================== Global names ====================

    /// Every name declared for `kind`. Cached until that kind changes.
    pub fn all_names(&self, kind: DeclKind) -> Arc<BTreeSet<String>> {
        if let Some(entry) = self.caches.names.lock().get(&kind) {
            if entry.is_current(&self.index) {
                trace!(kind = kind.name(), "names cache hit");
                return entry.value.clone();
            }
        }
        let names = Arc::new(self.index.all_names(kind));
        let dependencies = Dependencies::on_kinds(&self.index, &[kind]);
        store(&self.caches.names, kind, Tracked::new(names.clone(), dependencies));
        names
    }

    /// Locations of every declaration of `kind` named `name`.
    pub fn declarations_named(&self, kind: DeclKind, name: &str) -> Vec<SourceRange> {
        self.index
            .query(kind, name)
            .iter()
            .map(|d| d.location())
            .collect()
    }

    // ==================== Templates ====================

    /// Blocks visible in the template declared by `file`.
    pub fn blocks_visible_at(&self, file: FileId) -> Vec<VisibleBlock> {
        self.blocks_visible_cancellable(file, &CancellationToken::new())
            .unwrap_or_default()
    }

    /// Like [`Analysis::blocks_visible_at`], but `None` if `cancel` fires.
    pub fn blocks_visible_cancellable(
        &self,
        file: FileId,
        cancel: &CancellationToken,
    ) -> Option<Vec<VisibleBlock>> {
        match template_of_file(&self.index, file) {
            Some(template) => {
                blocks_visible_at(&self.index, &template.path, &self.config, cancel)
            }
            None => Some(Vec::new()),
        }
    }

    /// Blocks named `name` in any template.
    pub fn by_global_name(&self, name: &str) -> Vec<SourceRange> {
        by_global_name(&self.index, name)
            .iter()
            .map(|b| b.location)
            .collect()
    }

    /// Every declaration of block `name` as seen from `context`.
    pub fn find_block_declarations(&self, context: Option<FileId>, name: &str) -> ReferenceResult {
        find_block_declarations(&self.index, &self.config, context, name, &CancellationToken::new())
            .unwrap_or_default()
    }

    // ==================== Methods ====================

    /// Missing-method diagnostics for `file`.
    pub fn validate(&self, file: FileId) -> Vec<Diagnostic> {
        let graph = self.service_graph();
        check_file(&self.index, &graph, &self.config, file)
    }

    /// Reference sites naming `method` on `class_fqn`.
    pub fn find_method_references(&self, class_fqn: &str, method: &str) -> ReferenceResult {
        let graph = self.service_graph();
        find_method_references(&self.index, &graph, &self.config, class_fqn, method)
    }

    pub fn is_method_implicitly_used(&self, class_fqn: &str, method: &str) -> bool {
        let graph = self.service_graph();
        is_method_implicitly_used(&self.index, &graph, &self.config, class_fqn, method)
    }

    pub fn is_class_implicitly_used(&self, class_fqn: &str) -> bool {
        let graph = self.service_graph();
        is_class_implicitly_used(&self.index, &graph, &self.config, class_fqn)
    }

    // ==================== Symbols ====================

    /// Get all symbols in a document.
    pub fn document_symbols(&self, file: FileId) -> Vec<SymbolInfo> {
        document_symbols(&self.index, file)
    }

    /// Search for symbols across the workspace.
    pub fn workspace_symbols(&self, query: Option<&str>) -> Vec<SymbolInfo> {
        workspace_symbols(&self.index, query)
    }

    // ==================== Accessors ====================

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    /// Revision of the index this snapshot reads.
    pub fn revision(&self) -> u64 {
        self.index.revision()
    }

    pub fn file_path(&self, file: FileId) -> Option<&str> {
        self.index.file_path(file)
    }

    /// Get the FileId of an indexed path.
    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.index
            .files()
            .into_iter()
            .find(|(_, p)| *p == path)
            .map(|(file, _)| file)
    }
}
