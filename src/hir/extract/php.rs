//! PHP classes, route annotations and event subscriptions.

use crate::syntax::{PhpAttribute, PhpClass, PhpExpr, PhpFile, PhpMethod, StringLiteral};

use super::super::declarations::{
    ClassDeclaration, Declaration, EventSubscription, ImportTable, MethodDeclaration,
    ParameterInfo, RouteDeclaration, SubscriptionOrigin, listener_method_name,
};
use super::{Extraction, SiteOrigin, SiteOwner};

/// Route annotations and attributes, fully qualified.
const ROUTE_ANNOTATIONS: &[&str] = &[
    "Symfony\\Component\\Routing\\Annotation\\Route",
    "Symfony\\Component\\Routing\\Attribute\\Route",
    "Sensio\\Bundle\\FrameworkExtraBundle\\Configuration\\Route",
];

const LISTENER_ATTRIBUTE: &str = "Symfony\\Component\\EventDispatcher\\Attribute\\AsEventListener";

const SUBSCRIBED_EVENTS_METHOD: &str = "getSubscribedEvents";

const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "self", "static", "string", "true", "void",
];

pub(super) fn extract(out: &mut Extraction, file: &PhpFile) {
    let imports = ImportTable {
        namespace: file.namespace.clone(),
        aliases: file.import_alias_table(),
    };
    for class in &file.classes {
        class_declaration(out, &imports, file, class);
    }
    out.result.imports = imports;
}

/// Name a route gets when its annotation does not set one.
///
/// Lowercased `Namespace_Class_method` with `bundle_`/`controller_`
/// collapsed, a trailing `action` dropped and doubled underscores squeezed.
pub fn default_route_name(class_fqn: &str, method: &str) -> String {
    let name = format!("{}_{}", class_fqn.replace('\\', "_"), method).to_lowercase();
    let name = name.replace("bundle_", "_").replace("controller_", "_");
    let name = match name.strip_suffix("action") {
        Some(stripped) => stripped.to_string(),
        None => name,
    };
    name.replace("__", "_")
}

struct RoutePrefix {
    name: String,
    path: String,
}

fn class_declaration(out: &mut Extraction, imports: &ImportTable, file: &PhpFile, class: &PhpClass) {
    let fqn = file.qualify_declared(&class.name);

    let prefix = route_annotations(imports, &class.attributes, &class.doc_annotations)
        .next()
        .map(|attr| RoutePrefix {
            name: string_argument(attr, "name", usize::MAX)
                .map(|s| s.value.clone())
                .unwrap_or_default(),
            path: string_argument(attr, "path", 0)
                .map(|s| s.value.clone())
                .unwrap_or_default(),
        });

    for attr in class
        .attributes
        .iter()
        .filter(|a| imports.resolve_to_fqn(&a.name).eq_ignore_ascii_case(LISTENER_ATTRIBUTE))
    {
        let Some(event) = string_argument(attr, "event", 0) else {
            continue;
        };
        let method = string_argument(attr, "method", usize::MAX);
        if let Some(method) = method {
            out.site(
                SiteOrigin::ListenerAttribute,
                &method.value,
                method.range,
                SiteOwner::Class(fqn.clone()),
                Some(event.value.clone()),
            );
        }
        let method_name = method
            .map(|m| m.value.trim().to_string())
            .unwrap_or_else(|| listener_method_name(&event.value));
        let location = out.range(attr.range);
        out.push_arc(
            Declaration::Event,
            EventSubscription {
                event_name: event.value.clone(),
                method_name,
                priority: int_argument(attr, "priority"),
                owning_class: fqn.clone(),
                origin: SubscriptionOrigin::AttributeDeclared,
                location,
            },
        );
    }

    let mut methods = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        methods.push(method_declaration(out, imports, &fqn, prefix.as_ref(), method));
    }

    let location = out.range(class.name_range);
    out.push_arc(
        Declaration::Class,
        ClassDeclaration {
            parent: class.parent.as_deref().map(|p| imports.resolve_to_fqn(p)),
            interfaces: class
                .interfaces
                .iter()
                .map(|i| imports.resolve_to_fqn(i))
                .collect(),
            traits: class.traits.iter().map(|t| imports.resolve_to_fqn(t)).collect(),
            is_abstract: class.is_abstract,
            is_interface: class.is_interface,
            methods,
            location,
            fqn,
        },
    );
}

fn method_declaration(
    out: &mut Extraction,
    imports: &ImportTable,
    class_fqn: &str,
    prefix: Option<&RoutePrefix>,
    method: &PhpMethod,
) -> MethodDeclaration {
    let mut has_route = false;
    for attr in route_annotations(imports, &method.attributes, &method.doc_annotations) {
        has_route = true;
        let name = string_argument(attr, "name", usize::MAX)
            .map(|s| s.value.clone())
            .unwrap_or_else(|| default_route_name(class_fqn, &method.name));
        let path = string_argument(attr, "path", 0).map(|s| s.value.clone());
        let (name, path) = match prefix {
            Some(prefix) => (
                format!("{}{}", prefix.name, name),
                Some(format!("{}{}", prefix.path, path.unwrap_or_default())),
            ),
            None => (name, path),
        };
        let location = if attr.range.is_empty() {
            out.range(method.name_range)
        } else {
            out.range(attr.range)
        };
        out.push_arc(
            Declaration::Route,
            RouteDeclaration {
                name,
                controller: Some(format!("{}::{}", class_fqn, method.name)),
                path,
                location,
            },
        );
    }

    for attr in method
        .attributes
        .iter()
        .filter(|a| imports.resolve_to_fqn(&a.name).eq_ignore_ascii_case(LISTENER_ATTRIBUTE))
    {
        let Some(event) = string_argument(attr, "event", 0) else {
            continue;
        };
        let location = out.range(attr.range);
        out.push_arc(
            Declaration::Event,
            EventSubscription {
                event_name: event.value.clone(),
                method_name: method.name.clone(),
                priority: int_argument(attr, "priority"),
                owning_class: class_fqn.to_string(),
                origin: SubscriptionOrigin::AttributeDeclared,
                location,
            },
        );
    }

    if method.name.eq_ignore_ascii_case(SUBSCRIBED_EVENTS_METHOD) {
        for expr in &method.returns {
            subscribed_events(out, imports, class_fqn, expr);
        }
    }

    MethodDeclaration {
        name: method.name.clone(),
        visibility: method.visibility,
        is_static: method.is_static,
        parameters: method
            .parameters
            .iter()
            .map(|p| ParameterInfo {
                name: p.name.clone(),
                types: p
                    .type_hint
                    .as_deref()
                    .map(|hint| resolve_type_hint(imports, hint))
                    .unwrap_or_default(),
            })
            .collect(),
        has_route,
        location: out.range(method.name_range),
    }
}

/// Entries of a `getSubscribedEvents()` return array.
fn subscribed_events(out: &mut Extraction, imports: &ImportTable, class_fqn: &str, expr: &PhpExpr) {
    let PhpExpr::Array(items) = expr else {
        return;
    };
    for item in items {
        let event = match item.key {
            Some(PhpExpr::String(ref s)) if !s.value.trim().is_empty() => s.value.clone(),
            Some(PhpExpr::ClassConstant {
                ref class,
                ref name,
            }) => format!("{}::{}", imports.resolve_to_fqn(class), name),
            _ => continue,
        };

        let mut listeners: Vec<(&StringLiteral, i64)> = Vec::new();
        match item.value {
            PhpExpr::String(ref method) => listeners.push((method, 0)),
            PhpExpr::Array(ref inner) => match inner.first().map(|i| &i.value) {
                Some(PhpExpr::String(method)) => listeners.push((method, int_at(inner, 1))),
                Some(PhpExpr::Array(_)) => {
                    for entry in inner {
                        if let PhpExpr::Array(ref pair) = entry.value {
                            if let Some(PhpExpr::String(method)) = pair.first().map(|i| &i.value) {
                                listeners.push((method, int_at(pair, 1)));
                            }
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }

        for (method, priority) in listeners {
            out.site(
                SiteOrigin::SubscribedEvents,
                &method.value,
                method.range,
                SiteOwner::Class(class_fqn.to_string()),
                Some(event.clone()),
            );
            if method.value.trim().is_empty() {
                continue;
            }
            let location = out.range(method.range);
            out.push_arc(
                Declaration::Event,
                EventSubscription {
                    event_name: event.clone(),
                    method_name: method.value.trim().to_string(),
                    priority,
                    owning_class: class_fqn.to_string(),
                    origin: SubscriptionOrigin::InterfaceImplemented,
                    location,
                },
            );
        }
    }
}

fn route_annotations<'a>(
    imports: &'a ImportTable,
    attributes: &'a [PhpAttribute],
    annotations: &'a [PhpAttribute],
) -> impl Iterator<Item = &'a PhpAttribute> + 'a {
    attributes.iter().chain(annotations).filter(move |a| {
        let fqn = imports.resolve_to_fqn(a.name.trim_start_matches('@'));
        ROUTE_ANNOTATIONS.iter().any(|r| r.eq_ignore_ascii_case(&fqn))
    })
}

fn string_argument<'a>(attr: &'a PhpAttribute, name: &str, position: usize) -> Option<&'a StringLiteral> {
    attr.argument(name, position)
        .and_then(PhpExpr::as_string)
        .filter(|s| !s.value.trim().is_empty())
}

fn int_argument(attr: &PhpAttribute, name: &str) -> i64 {
    match attr.named(name) {
        Some(PhpExpr::Int(value)) => *value,
        _ => 0,
    }
}

fn int_at(items: &[crate::syntax::PhpArrayItem], index: usize) -> i64 {
    match items.get(index).map(|i| &i.value) {
        Some(PhpExpr::Int(value)) => *value,
        _ => 0,
    }
}

fn resolve_type_hint(imports: &ImportTable, hint: &str) -> Vec<String> {
    hint.split('|')
        .map(|t| t.trim().trim_start_matches('?'))
        .filter(|t| !t.is_empty())
        .filter(|t| !BUILTIN_TYPES.iter().any(|b| b.eq_ignore_ascii_case(t)))
        .map(|t| imports.resolve_to_fqn(t))
        .collect()
}
