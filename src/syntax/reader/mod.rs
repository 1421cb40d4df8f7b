//! Text readers producing host trees.
//!
//! Hosts with their own parser hand us trees directly. These readers cover
//! the rest: XML via `quick-xml`, YAML via `serde_yaml` (both behind the
//! `readers` feature) and Twig via a small tag scanner.

#[cfg(feature = "readers")]
mod xml;
#[cfg(feature = "readers")]
mod yaml;
mod twig;

use thiserror::Error;

use super::{SyntaxFile, SyntaxKind};

#[cfg(feature = "readers")]
pub use xml::read_xml;
#[cfg(feature = "readers")]
pub use yaml::read_yaml;
pub use twig::read_twig;

/// Errors produced while reading source text into a host tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// XML was not well-formed.
    #[error("XML error at byte {offset}: {message}")]
    Xml { offset: usize, message: String },

    /// YAML could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// A Twig tag was not terminated.
    #[error("Twig error at byte {offset}: {message}")]
    Twig { offset: usize, message: String },

    /// No reader exists for this syntax (or it was compiled out).
    #[error("Unsupported: no reader for {0} files")]
    Unsupported(&'static str),
}

impl ReadError {
    pub fn xml(offset: usize, message: impl Into<String>) -> Self {
        Self::Xml {
            offset,
            message: message.into(),
        }
    }

    pub fn twig(offset: usize, message: impl Into<String>) -> Self {
        Self::Twig {
            offset,
            message: message.into(),
        }
    }
}

/// Read `text` as the given syntax.
pub fn read_file(kind: SyntaxKind, text: &str) -> Result<SyntaxFile, ReadError> {
    match kind {
        #[cfg(feature = "readers")]
        SyntaxKind::Xml => read_xml(text).map(SyntaxFile::Xml),
        #[cfg(feature = "readers")]
        SyntaxKind::Yaml => read_yaml(text).map(SyntaxFile::Yaml),
        SyntaxKind::Twig => read_twig(text).map(SyntaxFile::Twig),
        other => Err(ReadError::Unsupported(other.name())),
    }
}
