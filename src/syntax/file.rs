//! Syntax file wrapper tagging a host tree with the syntax it came from.

use std::path::Path;

use super::{PhpFile, TwigFile, XmlTag, YamlNode};

/// The source syntaxes this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Xml,
    Yaml,
    Php,
    Twig,
}

impl SyntaxKind {
    /// Guess the syntax from a file path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(SyntaxKind::Xml),
            "yml" | "yaml" => Some(SyntaxKind::Yaml),
            "php" => Some(SyntaxKind::Php),
            "twig" => Some(SyntaxKind::Twig),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyntaxKind::Xml => "xml",
            SyntaxKind::Yaml => "yaml",
            SyntaxKind::Php => "php",
            SyntaxKind::Twig => "twig",
        }
    }
}

/// A host-supplied syntax tree for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxFile {
    /// Root element of an XML document.
    Xml(XmlTag),
    /// Root node of a YAML document.
    Yaml(YamlNode),
    Php(PhpFile),
    Twig(TwigFile),
}

impl SyntaxFile {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxFile::Xml(_) => SyntaxKind::Xml,
            SyntaxFile::Yaml(_) => SyntaxKind::Yaml,
            SyntaxFile::Php(_) => SyntaxKind::Php,
            SyntaxFile::Twig(_) => SyntaxKind::Twig,
        }
    }
}
