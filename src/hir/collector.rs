//! Lazy service collector.
//!
//! [`ServiceGraph`] is the fully resolved view of the container: each
//! service's effective class after following aliases and `parent` chains,
//! plus reverse indexes by tag and by class. It is the one expensive
//! structure, so [`LazyServiceCollector`] builds it at most once per
//! service/parameter revision and hands out shared copies.

use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::config::AnalysisConfig;
use super::declarations::{
    DeclKind, Declaration, Prototype, ServiceDeclaration, SubscriptionOrigin,
    listener_method_name, looks_like_class,
};
use super::hierarchy::first_parameter_types;
use super::index::{Dependencies, ProjectIndex};

/// Kinds the service graph is derived from.
const GRAPH_KINDS: &[DeclKind] = &[DeclKind::Service, DeclKind::Parameter];

/// Expand a value written entirely as `%name%` through parameter values.
///
/// Returns `None` when a parameter is missing or the chain is too long.
pub fn expand_parameters(index: &ProjectIndex, value: &str, max_hops: usize) -> Option<String> {
    let mut current = value.trim().to_string();
    for _ in 0..=max_hops {
        let Some(name) = parameter_name(&current) else {
            return Some(current);
        };
        let Some(Declaration::Parameter(param)) = index.lookup(DeclKind::Parameter, name) else {
            return None;
        };
        current = param.value.clone()?.trim().to_string();
    }
    warn!(value, "parameter chain exceeds hop limit");
    None
}

fn parameter_name(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('%')?.strip_suffix('%')?;
    if inner.is_empty() || inner.contains('%') {
        None
    } else {
        Some(inner)
    }
}

/// The resolved service container at one index revision.
#[derive(Debug, Default)]
pub struct ServiceGraph {
    dependencies: Dependencies,
    services: FxHashMap<String, Arc<ServiceDeclaration>>,
    classes: FxHashMap<String, String>,
    broken: FxHashSet<String>,
    by_tag: FxHashMap<String, Vec<Arc<ServiceDeclaration>>>,
    by_class: FxHashMap<String, Vec<String>>,
    prototypes: Vec<Prototype>,
}

enum Step {
    Class(String),
    Unresolved,
    Broken,
}

impl ServiceGraph {
    /// Build the graph, or `None` if `cancel` fires first.
    pub fn build(
        index: &ProjectIndex,
        config: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> Option<Self> {
        let dependencies = Dependencies::on_kinds(index, GRAPH_KINDS);

        let mut services: FxHashMap<String, Arc<ServiceDeclaration>> = FxHashMap::default();
        let mut prototypes = Vec::new();
        for decl in index.declarations_of_kind(DeclKind::Service) {
            let Declaration::Service(service) = decl else {
                continue;
            };
            if let Some(ref prototype) = service.prototype {
                prototypes.push(prototype.clone());
                continue;
            }
            // Later entries win.
            services.insert(service.id.clone(), service);
        }

        let mut ids: Vec<&String> = services.keys().collect();
        ids.sort();

        let mut classes = FxHashMap::default();
        let mut broken = FxHashSet::default();
        let mut by_tag: FxHashMap<String, Vec<Arc<ServiceDeclaration>>> = FxHashMap::default();
        let mut by_class: FxHashMap<String, Vec<String>> = FxHashMap::default();

        for id in ids {
            if cancel.is_cancelled() {
                debug!("service graph build cancelled");
                return None;
            }
            let service = &services[id];
            match effective_class(index, &services, service, config.max_chain_hops) {
                Step::Class(class) => {
                    by_class
                        .entry(class.to_ascii_lowercase())
                        .or_default()
                        .push(id.clone());
                    classes.insert(id.clone(), class);
                }
                Step::Unresolved => {}
                Step::Broken => {
                    warn!(service = %id, "service chain is cyclic or too long; excluded");
                    broken.insert(id.clone());
                    continue;
                }
            }
            for tag in &service.tags {
                let bucket = by_tag.entry(tag.name.clone()).or_default();
                if !bucket.iter().any(|s| Arc::ptr_eq(s, service)) {
                    bucket.push(service.clone());
                }
            }
        }

        debug!(
            services = services.len(),
            classes = classes.len(),
            broken = broken.len(),
            tags = by_tag.len(),
            revision = index.revision(),
            "service graph built"
        );

        Some(Self {
            dependencies,
            services,
            classes,
            broken,
            by_tag,
            by_class,
            prototypes,
        })
    }

    /// Effective class of a service, following aliases and parents.
    pub fn get_service_class(&self, id: &str) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }

    /// Services bearing `tag`, ordered by id.
    pub fn get_services_by_tag(&self, tag: &str) -> &[Arc<ServiceDeclaration>] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// The winning definition of `id`.
    pub fn service(&self, id: &str) -> Option<&Arc<ServiceDeclaration>> {
        self.services.get(id)
    }

    /// Whether `id` was excluded for a cyclic or over-long chain.
    pub fn is_broken(&self, id: &str) -> bool {
        self.broken.contains(id)
    }

    /// Ids of services whose effective class is `fqn`.
    pub fn services_of_class(&self, fqn: &str) -> &[String] {
        self.by_class
            .get(&fqn.trim_start_matches('\\').to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `fqn` is registered as a service, explicitly or by prototype.
    pub fn is_service_class(&self, fqn: &str) -> bool {
        let fqn = fqn.trim_start_matches('\\');
        !self.services_of_class(fqn).is_empty()
            || self.prototypes.iter().any(|p| {
                let namespace = p.namespace.as_str();
                !namespace.is_empty()
                    && fqn
                        .get(..namespace.len())
                        .is_some_and(|head| head.eq_ignore_ascii_case(namespace))
                    && fqn.as_bytes().get(namespace.len()) == Some(&b'\\')
            })
    }

    /// Every service id, sorted.
    pub fn service_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.services.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Candidate payload types for listeners of `event`.
    ///
    /// Collects the first parameter type of every method already listening
    /// to `event`: listener-tagged services with a matching `event`
    /// attribute, plus attribute and subscriber-interface subscriptions.
    pub fn get_tagged_method_parameter_types(
        &self,
        index: &ProjectIndex,
        config: &AnalysisConfig,
        event: &str,
    ) -> IndexSet<String> {
        let mut types = IndexSet::new();
        let event = event.trim();
        if event.is_empty() {
            return types;
        }

        for tag_name in &config.event_listener_tags {
            for service in self.get_services_by_tag(tag_name) {
                let Some(class) = self.get_service_class(&service.id) else {
                    continue;
                };
                for tag in service.tags_named(tag_name) {
                    if tag.attribute("event").map(str::trim) != Some(event) {
                        continue;
                    }
                    let method = tag
                        .attribute("method")
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| listener_method_name(event));
                    types.extend(first_parameter_types(index, class, &method, config.max_chain_hops));
                }
            }
        }

        for decl in index.query(DeclKind::EventSubscription, event) {
            let Declaration::Event(subscription) = decl else {
                continue;
            };
            if subscription.origin == SubscriptionOrigin::TagDeclared {
                continue;
            }
            types.extend(first_parameter_types(
                index,
                &subscription.owning_class,
                &subscription.method_name,
                config.max_chain_hops,
            ));
        }

        types
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn is_current(&self, index: &ProjectIndex) -> bool {
        self.dependencies.is_current(index)
    }
}

fn effective_class(
    index: &ProjectIndex,
    services: &FxHashMap<String, Arc<ServiceDeclaration>>,
    start: &Arc<ServiceDeclaration>,
    max_hops: usize,
) -> Step {
    let mut current = start;
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut hops = 0;

    loop {
        if !visited.insert(current.id.as_str()) || hops > max_hops {
            return Step::Broken;
        }
        hops += 1;

        let next_id = if let Some(ref alias) = current.alias {
            alias
        } else if let Some(ref class) = current.class {
            return match expand_parameters(index, class, max_hops) {
                Some(class) if !class.is_empty() => {
                    Step::Class(class.trim_start_matches('\\').to_string())
                }
                _ => Step::Unresolved,
            };
        } else if let Some(ref parent) = current.parent_id {
            parent
        } else if looks_like_class(&current.id) {
            return Step::Class(current.id.trim_start_matches('\\').to_string());
        } else {
            return Step::Unresolved;
        };

        match services.get(next_id.as_str()) {
            Some(next) => current = next,
            None if current.alias.is_some() && looks_like_class(next_id) => {
                return Step::Class(next_id.trim_start_matches('\\').to_string());
            }
            None => return Step::Unresolved,
        }
    }
}

/// Memoizes one [`ServiceGraph`] per index revision.
///
/// The build runs under the lock, so concurrent first accesses for the
/// same revision wait for a single build and share its result.
#[derive(Debug, Default)]
pub struct LazyServiceCollector {
    slot: Mutex<Option<Arc<ServiceGraph>>>,
}

impl LazyServiceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph for `index`, built on first use. `None` if cancelled.
    pub fn get(
        &self,
        index: &ProjectIndex,
        config: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> Option<Arc<ServiceGraph>> {
        let mut slot = self.slot.lock();
        if let Some(graph) = slot.as_ref() {
            if graph.is_current(index) {
                trace!(revision = index.revision(), "service graph cache hit");
                return Some(graph.clone());
            }
        }

        let graph = Arc::new(ServiceGraph::build(index, config, cancel)?);
        let newer_cached = slot
            .as_ref()
            .is_some_and(|g| g.dependencies.revision() > index.revision());
        if !newer_cached {
            *slot = Some(graph.clone());
        }
        Some(graph)
    }

    /// Drop the memoized graph.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}
