//! Project symbol index.
//!
//! Declarations are indexed by `(kind, name)` and partitioned by owning
//! file, so that a file's entries are dropped and rebuilt together. Every
//! commit bumps a global revision; a file's generation is the revision of
//! its last commit, and each kind remembers the last revision that touched
//! it. Cached query results record those counters as [`Dependencies`].
//!
//! Within one name bucket entries are ordered by `(file path, file id,
//! position in file)`. The last entry wins where a single declaration is
//! needed, so duplicate ids resolve the same way regardless of load order.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::FileId;

use super::declarations::{DeclKind, Declaration, FileDeclarations, ImportTable};
use super::extract::ReferenceSite;

#[derive(Clone, Debug)]
struct IndexedDecl {
    path: Arc<str>,
    file: FileId,
    ordinal: u32,
    declaration: Declaration,
}

impl IndexedDecl {
    fn sort_key(&self) -> (&str, FileId, u32) {
        (&self.path, self.file, self.ordinal)
    }
}

#[derive(Clone, Debug)]
struct FileEntry {
    path: Arc<str>,
    generation: u64,
    contents: Arc<FileDeclarations>,
    keys: Vec<(DeclKind, SmolStr)>,
}

/// File-partitioned, generation-stamped declaration store.
#[derive(Clone, Debug, Default)]
pub struct ProjectIndex {
    files: FxHashMap<FileId, FileEntry>,
    names: [FxHashMap<SmolStr, Vec<IndexedDecl>>; DeclKind::COUNT],
    revision: u64,
    kind_revisions: [u64; DeclKind::COUNT],
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything `file` contributes. Returns the file's new generation.
    pub fn put(&mut self, file: FileId, path: &str, declarations: FileDeclarations) -> u64 {
        let mut touched = [false; DeclKind::COUNT];
        self.remove_entries(file, &mut touched);
        self.revision += 1;

        let path: Arc<str> = Arc::from(path);
        let mut keys = Vec::new();
        for (ordinal, declaration) in declarations.declarations.iter().enumerate() {
            let Some(kind) = declaration.kind() else {
                continue;
            };
            let key = kind.index_key(declaration.name());
            let entry = IndexedDecl {
                path: path.clone(),
                file,
                ordinal: ordinal as u32,
                declaration: declaration.clone(),
            };
            let bucket = self.names[kind.index()].entry(key.clone()).or_default();
            let at = bucket.partition_point(|e| e.sort_key() < entry.sort_key());
            bucket.insert(at, entry);
            touched[kind.index()] = true;
            keys.push((kind, key));
        }
        keys.sort();
        keys.dedup();

        self.bump(&touched);
        debug!(
            file = %file,
            path = %path,
            declarations = declarations.declarations.len(),
            sites = declarations.sites.len(),
            revision = self.revision,
            "index commit"
        );
        self.files.insert(
            file,
            FileEntry {
                path,
                generation: self.revision,
                contents: Arc::new(declarations),
                keys,
            },
        );
        self.revision
    }

    /// Drop everything `file` contributes. Returns false if it was not indexed.
    pub fn invalidate(&mut self, file: FileId) -> bool {
        if !self.files.contains_key(&file) {
            return false;
        }
        let mut touched = [false; DeclKind::COUNT];
        self.remove_entries(file, &mut touched);
        self.revision += 1;
        self.bump(&touched);
        debug!(file = %file, revision = self.revision, "index invalidate");
        true
    }

    fn remove_entries(&mut self, file: FileId, touched: &mut [bool; DeclKind::COUNT]) {
        let Some(entry) = self.files.remove(&file) else {
            return;
        };
        for (kind, key) in entry.keys {
            let names = &mut self.names[kind.index()];
            if let Some(bucket) = names.get_mut(&key) {
                bucket.retain(|e| e.file != file);
                if bucket.is_empty() {
                    names.remove(&key);
                }
            }
            touched[kind.index()] = true;
        }
    }

    fn bump(&mut self, touched: &[bool; DeclKind::COUNT]) {
        for kind in DeclKind::ALL {
            if touched[kind.index()] {
                self.kind_revisions[kind.index()] = self.revision;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Every declaration of `kind` named `name`, in tie-break order.
    pub fn query(&self, kind: DeclKind, name: &str) -> Vec<Declaration> {
        self.bucket(kind, name)
            .iter()
            .map(|e| e.declaration.clone())
            .collect()
    }

    /// The winning declaration of `kind` named `name`.
    pub fn lookup(&self, kind: DeclKind, name: &str) -> Option<Declaration> {
        self.bucket(kind, name).last().map(|e| e.declaration.clone())
    }

    fn bucket(&self, kind: DeclKind, name: &str) -> &[IndexedDecl] {
        self.names[kind.index()]
            .get(&kind.index_key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every declared name of `kind`, spelled as the winning declaration.
    pub fn all_names(&self, kind: DeclKind) -> BTreeSet<String> {
        self.names[kind.index()]
            .values()
            .filter_map(|bucket| bucket.last())
            .map(|e| e.declaration.name().to_string())
            .collect()
    }

    /// Every declaration of `kind`, ordered by file path then position.
    pub fn declarations_of_kind(&self, kind: DeclKind) -> Vec<Declaration> {
        let mut entries: Vec<&IndexedDecl> = self.names[kind.index()].values().flatten().collect();
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        entries.into_iter().map(|e| e.declaration.clone()).collect()
    }

    pub fn declarations_in_file(&self, file: FileId) -> &[Declaration] {
        self.files
            .get(&file)
            .map(|e| e.contents.declarations.as_slice())
            .unwrap_or_default()
    }

    pub fn sites_in_file(&self, file: FileId) -> &[ReferenceSite] {
        self.files
            .get(&file)
            .map(|e| e.contents.sites.as_slice())
            .unwrap_or_default()
    }

    pub fn import_table(&self, file: FileId) -> Option<&ImportTable> {
        self.files.get(&file).map(|e| &e.contents.imports)
    }

    pub fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(|e| e.path.as_ref())
    }

    /// Indexed files, ordered by path.
    pub fn files(&self) -> Vec<(FileId, &str)> {
        let mut files: Vec<_> = self
            .files
            .iter()
            .map(|(id, e)| (*id, e.path.as_ref()))
            .collect();
        files.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.files.contains_key(&file)
    }

    // ------------------------------------------------------------------------
    // Modification tracking
    // ------------------------------------------------------------------------

    pub fn generation(&self, file: FileId) -> Option<u64> {
        self.files.get(&file).map(|e| e.generation)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn kind_revision(&self, kind: DeclKind) -> u64 {
        self.kind_revisions[kind.index()]
    }
}

// ============================================================================
// DEPENDENCIES
// ============================================================================

/// One counter a cached result was computed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dependency {
    Kind(DeclKind, u64),
    /// `None` when the file was not indexed.
    File(FileId, Option<u64>),
}

/// The counters a cached result depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependencies {
    revision: u64,
    entries: Vec<Dependency>,
}

impl Dependencies {
    /// Depend on every declaration of `kinds`.
    pub fn on_kinds(index: &ProjectIndex, kinds: &[DeclKind]) -> Self {
        Self {
            revision: index.revision(),
            entries: kinds
                .iter()
                .map(|k| Dependency::Kind(*k, index.kind_revision(*k)))
                .collect(),
        }
    }

    /// Also depend on the contents of `file`.
    pub fn with_file(mut self, index: &ProjectIndex, file: FileId) -> Self {
        self.entries
            .push(Dependency::File(file, index.generation(file)));
        self
    }

    /// Whether every recorded counter still matches `index`.
    pub fn is_current(&self, index: &ProjectIndex) -> bool {
        self.entries.iter().all(|dep| match *dep {
            Dependency::Kind(kind, revision) => index.kind_revision(kind) == revision,
            Dependency::File(file, generation) => index.generation(file) == generation,
        })
    }

    /// Revision of the snapshot the result was computed from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }
}

/// A query result tagged with what it was computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked<T> {
    pub value: T,
    pub dependencies: Dependencies,
}

impl<T> Tracked<T> {
    pub fn new(value: T, dependencies: Dependencies) -> Self {
        Self {
            value,
            dependencies,
        }
    }

    pub fn is_current(&self, index: &ProjectIndex) -> bool {
        self.dependencies.is_current(index)
    }
}
