//! Class hierarchy walks over indexed classes.
//!
//! Walks are iterative with a visited set and stop after
//! `max_hops` classes, so a cyclic `extends` never loops.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::warn;

use super::declarations::{ClassDeclaration, DeclKind, Declaration};
use super::index::ProjectIndex;

/// Outcome of looking a method up through a class hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodLookup {
    Found(Declaration),
    /// Every class in the hierarchy is indexed and none declares it.
    Missing,
    /// Some ancestor is not indexed, so absence cannot be decided.
    Unknown,
}

impl MethodLookup {
    pub fn found(self) -> Option<Declaration> {
        match self {
            MethodLookup::Found(decl) => Some(decl),
            _ => None,
        }
    }
}

/// Winning class declaration for a fully-qualified name.
pub fn lookup_class(index: &ProjectIndex, fqn: &str) -> Option<Arc<ClassDeclaration>> {
    match index.lookup(DeclKind::Class, fqn)? {
        Declaration::Class(class) => Some(class),
        _ => None,
    }
}

/// Find `name` on `class`, its used traits and its parents.
///
/// Method names compare case-insensitively.
pub fn find_method(
    index: &ProjectIndex,
    class: &Arc<ClassDeclaration>,
    name: &str,
    max_hops: usize,
) -> MethodLookup {
    let mut queue = VecDeque::from([class.clone()]);
    let mut seen = FxHashSet::default();
    let mut complete = true;

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.fqn.to_ascii_lowercase()) {
            continue;
        }
        if seen.len() > max_hops {
            warn!(class = %class.fqn, "class hierarchy exceeds hop limit");
            return MethodLookup::Unknown;
        }
        if let Some(position) = current.method(name).map(|(i, _)| i) {
            return MethodLookup::Found(Declaration::Method {
                class: current,
                index: position,
            });
        }
        for ancestor in current.traits.iter().chain(current.parent.as_ref()) {
            match lookup_class(index, ancestor) {
                Some(found) => queue.push_back(found),
                None => complete = false,
            }
        }
    }

    if complete {
        MethodLookup::Missing
    } else {
        MethodLookup::Unknown
    }
}

/// Whether `fqn` extends or implements `base`, directly or transitively.
pub fn is_subclass_of(index: &ProjectIndex, fqn: &str, base: &str, max_hops: usize) -> bool {
    let base = base.trim_start_matches('\\');
    let start = fqn.trim_start_matches('\\');
    let mut queue = VecDeque::from([start.to_string()]);
    let mut seen = FxHashSet::default();

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.to_ascii_lowercase()) {
            continue;
        }
        if seen.len() > max_hops {
            warn!(class = %fqn, "class hierarchy exceeds hop limit");
            return false;
        }
        if current.eq_ignore_ascii_case(base) && !current.eq_ignore_ascii_case(start) {
            return true;
        }
        if let Some(class) = lookup_class(index, &current) {
            queue.extend(class.parent.iter().cloned());
            queue.extend(class.interfaces.iter().cloned());
        }
    }
    false
}

/// Fully-qualified types of the first parameter of `class::method`.
pub(crate) fn first_parameter_types(
    index: &ProjectIndex,
    class_fqn: &str,
    method: &str,
    max_hops: usize,
) -> Vec<String> {
    let Some(class) = lookup_class(index, class_fqn) else {
        return Vec::new();
    };
    find_method(index, &class, method, max_hops)
        .found()
        .and_then(|decl| {
            decl.as_method()
                .and_then(|(_, m)| m.parameters.first().map(|p| p.types.clone()))
        })
        .unwrap_or_default()
}
