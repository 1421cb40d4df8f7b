//! HIR layer tests
//!
//! Tests for the declaration model and the queries over it:
//! - Index commits, invalidation and generations
//! - Reference resolution
//! - Service graph collection
//! - Template block visibility
//! - Missing-method diagnostics
//! - Implicit usage

pub mod tests_blocks;
pub mod tests_collector;
pub mod tests_diagnostics;
pub mod tests_extraction;
pub mod tests_index;
pub mod tests_usage;
