//! # xref-base
//!
//! Cross-format symbol resolution for dependency-injection containers,
//! routes, event subscribers and template blocks.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost / Analysis snapshots, completion, goto, symbols
//!   ↓
//! hir       → Declarations, ProjectIndex, Resolver, service graph, validation
//!   ↓
//! syntax    → Host syntax trees (XML, YAML, PHP, Twig) and text readers
//!   ↓
//! base      → Primitives (FileId, TextRange, SourceRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → hir → ide)
// ============================================================================

/// Foundation types: FileId, TextRange, SourceRange
pub mod base;

/// Syntax: host-supplied trees and optional readers
pub mod syntax;

/// High-level IR: declarations, index and queries
pub mod hir;

/// IDE features: completion, goto-declaration, references, symbols
pub mod ide;

// Re-export foundation types
pub use base::{FileId, SourceRange, TextRange, TextSize};
