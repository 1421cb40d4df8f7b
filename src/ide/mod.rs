//! IDE features — High-level APIs for editor integrations.
//!
//! This module provides the interface between the HIR and the excluded
//! UI collaborators (completion, navigation, symbol search, inspections).
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at the boundary
//! 3. **Composable**: Built on top of HIR queries
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use xref::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! let file = host.set_file_content("config/services.yaml", text)?;
//!
//! let analysis = host.analysis();
//! let diagnostics = analysis.validate(file);
//! ```

mod analysis;
mod completion;
mod goto;
mod references;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, lookup_elements_for};
pub use goto::{GotoResult, GotoTarget, targets_for};
pub use references::{Reference, ReferenceResult, find_block_declarations, find_method_references};
pub use symbols::{SymbolInfo, SymbolKind, document_symbols, workspace_symbols};
