//! HIR test helpers for setting up analysis hosts and indexes.

use xref::base::FileId;
use xref::hir::{ProjectIndex, extract};
use xref::ide::AnalysisHost;
use xref::syntax::{PhpClass, PhpFile, PhpMethod, SyntaxFile};

/// Creates an AnalysisHost from source texts, asserting every file reads.
pub fn host_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let host = AnalysisHost::new();
    for (path, content) in files {
        if let Err(err) = host.set_file_content(path, content) {
            panic!("Read error in '{}': {}", path, err);
        }
    }
    host
}

/// Builds a bare index from syntax trees, one FileId per entry in order.
pub fn index_from_trees(files: Vec<(&str, SyntaxFile)>) -> ProjectIndex {
    let mut index = ProjectIndex::new();
    for (i, (path, syntax)) in files.into_iter().enumerate() {
        let file = FileId::new(i as u32);
        index.put(file, path, extract(file, path, &syntax));
    }
    index
}

/// Builds an index from source texts, one FileId per entry in order.
pub fn index_from_sources(files: &[(&str, &str)]) -> ProjectIndex {
    let trees = files
        .iter()
        .map(|(path, text)| {
            let kind = xref::syntax::SyntaxKind::from_path(path).expect("known extension");
            (*path, xref::syntax::read_file(kind, text).expect("readable source"))
        })
        .collect();
    index_from_trees(trees)
}

/// A PHP file declaring one class with plain public methods.
pub fn php_class(namespace: &str, name: &str, methods: &[&str]) -> SyntaxFile {
    let class = methods
        .iter()
        .fold(PhpClass::new(name), |class, m| class.with_method(PhpMethod::new(*m)));
    SyntaxFile::Php(PhpFile::new(Some(namespace)).with_class(class))
}

/// A PHP file declaring `class`.
pub fn php_file(namespace: &str, class: PhpClass) -> SyntaxFile {
    SyntaxFile::Php(PhpFile::new(Some(namespace)).with_class(class))
}
