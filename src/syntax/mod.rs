//! Host syntax trees.
//!
//! Parsing the four source syntaxes is not our job: the host hands us trees
//! whose nodes carry byte ranges. This module defines those trees, the
//! [`SyntaxFile`] wrapper that tags a tree with its syntax, and (behind the
//! `readers` feature) small readers that build the trees from text for hosts
//! that do not have a parser of their own.

pub mod file;
pub mod php;
pub mod reader;
pub mod twig;
pub mod xml;
pub mod yaml;

pub use file::{SyntaxFile, SyntaxKind};
pub use php::{
    PhpArgument, PhpArrayItem, PhpAttribute, PhpClass, PhpExpr, PhpFile, PhpImport, PhpMethod,
    PhpParameter, StringLiteral, Visibility,
};
pub use reader::{ReadError, read_file};
pub use twig::{TemplateRef, TwigBlockTag, TwigFile};
pub use xml::{XmlAttribute, XmlTag};
pub use yaml::{YamlEntry, YamlNode, YamlScalar};

/// Strip one pair of surrounding quote characters and trim whitespace.
///
/// Reference text arrives with whatever quoting the source syntax used
/// (`'foo'`, `"foo"`, bare `foo`).
pub fn trim_quotes(text: &str) -> &str {
    let text = text.trim();
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return text[1..text.len() - 1].trim();
        }
    }
    text
}

/// `None` for blank or whitespace-only values.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
