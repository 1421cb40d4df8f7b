//! Implicit usage: methods and classes the framework invokes on its own.
//!
//! These predicates never produce diagnostics. A dead-code detector asks
//! them before reporting a method or class as unused.

use super::collector::ServiceGraph;
use super::config::AnalysisConfig;
use super::declarations::{ClassDeclaration, DeclKind, Declaration};
use super::extract::split_controller;
use super::hierarchy::{is_subclass_of, lookup_class};
use super::index::ProjectIndex;
use super::resolve::Resolver;

/// Whether `method` of `class_fqn` is invoked by routing or event dispatch.
///
/// Only public methods qualify. A method is used when it carries a route
/// attribute or annotation, when a route controller string targets it, or
/// when an event subscription names it (case-insensitively).
pub fn is_method_implicitly_used(
    index: &ProjectIndex,
    services: &ServiceGraph,
    config: &AnalysisConfig,
    class_fqn: &str,
    method: &str,
) -> bool {
    let Some(class) = lookup_class(index, class_fqn) else {
        return false;
    };
    let Some((_, declared)) = class.method(method) else {
        return false;
    };
    if !declared.is_public() {
        return false;
    }
    if declared.has_route {
        return true;
    }

    let resolver = Resolver::new(index, services, config);
    is_route_controller(index, &resolver, config, &class, &declared.name)
        || is_subscribed(index, &resolver, config, &class, &declared.name)
}

/// Whether the framework instantiates `class_fqn` on its own.
///
/// A class is used when any public method is a route or an event listener,
/// or when it is a registered service extending the console command base.
pub fn is_class_implicitly_used(
    index: &ProjectIndex,
    services: &ServiceGraph,
    config: &AnalysisConfig,
    class_fqn: &str,
) -> bool {
    let Some(class) = lookup_class(index, class_fqn) else {
        return false;
    };

    if services.is_service_class(&class.fqn)
        && is_subclass_of(
            index,
            &class.fqn,
            &config.command_base_class,
            config.max_chain_hops,
        )
    {
        return true;
    }

    class.methods.iter().filter(|m| m.is_public()).any(|m| {
        m.has_route || {
            let resolver = Resolver::new(index, services, config);
            is_route_controller(index, &resolver, config, &class, &m.name)
                || is_subscribed(index, &resolver, config, &class, &m.name)
        }
    })
}

fn is_route_controller(
    index: &ProjectIndex,
    resolver: &Resolver<'_>,
    config: &AnalysisConfig,
    class: &ClassDeclaration,
    method: &str,
) -> bool {
    index
        .declarations_of_kind(DeclKind::Route)
        .iter()
        .filter_map(|decl| match decl {
            Declaration::Route(route) => route.controller.clone(),
            _ => None,
        })
        .any(|controller| {
            let (owner, target) = match split_controller(&controller) {
                Some((owner, target, _)) => (owner.to_string(), target.to_string()),
                // Invokable controller.
                None => (controller.clone(), "__invoke".to_string()),
            };
            target.eq_ignore_ascii_case(method)
                && owned_by(index, resolver, config, &owner, class)
        })
}

fn is_subscribed(
    index: &ProjectIndex,
    resolver: &Resolver<'_>,
    config: &AnalysisConfig,
    class: &ClassDeclaration,
    method: &str,
) -> bool {
    index
        .declarations_of_kind(DeclKind::EventSubscription)
        .iter()
        .any(|decl| match decl {
            Declaration::Event(subscription) => {
                subscription.method_name.eq_ignore_ascii_case(method)
                    && owned_by(index, resolver, config, &subscription.owning_class, class)
            }
            _ => false,
        })
}

/// Whether a class value resolves to `class` or one of its subclasses.
fn owned_by(
    index: &ProjectIndex,
    resolver: &Resolver<'_>,
    config: &AnalysisConfig,
    owner: &str,
    class: &ClassDeclaration,
) -> bool {
    match resolver.class_value_fqn(owner) {
        Some(fqn) => {
            fqn.eq_ignore_ascii_case(&class.fqn)
                || is_subclass_of(index, &fqn, &class.fqn, config.max_chain_hops)
        }
        None => false,
    }
}
