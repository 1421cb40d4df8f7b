//! YAML container and routing files.

use std::collections::BTreeSet;

use crate::syntax::{YamlEntry, YamlNode, YamlScalar, non_blank};

use super::super::declarations::{
    Declaration, ParameterDeclaration, Prototype, RouteDeclaration, ServiceDeclaration, ServiceTag,
};
use super::{Extraction, SiteOrigin, SiteOwner, split_controller, sub_range};

pub(super) fn extract(out: &mut Extraction, root: &YamlNode) {
    let mut container = false;
    if let Some(services) = root.get("services") {
        container = true;
        for entry in services.entries() {
            service(out, entry);
        }
    }
    if let Some(parameters) = root.get("parameters") {
        container = true;
        for entry in parameters.entries() {
            parameter(out, entry);
        }
    }
    if container || root.get("imports").is_some() {
        return;
    }
    for entry in root.entries() {
        route(out, entry);
    }
}

fn service(out: &mut Extraction, entry: &YamlEntry) {
    let Some(id) = entry.key.as_str() else {
        return;
    };
    if id.starts_with('_') {
        // `_defaults` and `_instanceof`
        return;
    }
    let location = out.range(entry.key.range);
    let mut decl = ServiceDeclaration::new(id, location);
    let body = &entry.value;

    if id.ends_with('\\') {
        if let Some(resource) = body.get_str("resource") {
            decl.prototype = Some(Prototype {
                namespace: id.trim_end_matches('\\').to_string(),
                resource: Some(resource.to_string()),
                exclude: excludes(body.get("exclude")),
            });
            out.push_arc(Declaration::Service, decl);
            return;
        }
    }

    if let Some(target) = body.as_str().and_then(|s| s.strip_prefix('@')) {
        decl.alias = non_blank(target).map(str::to_string);
        out.push_arc(Declaration::Service, decl);
        return;
    }

    decl.class = body.get_str("class").map(str::to_string);
    decl.parent_id = body.get_str("parent").map(str::to_string);
    decl.alias = body.get_str("alias").map(str::to_string);
    decl.is_abstract = body.get_flag("abstract");
    decl.is_synthetic = body.get_flag("synthetic");

    let owner = decl.class.clone().unwrap_or_else(|| id.to_string());

    for item in body.get("tags").map(YamlNode::items).unwrap_or_default() {
        let Some((tag, fields)) = service_tag(item) else {
            continue;
        };
        let method = fields.and_then(|f| f.get_scalar("method"));
        if let Some(method) = method {
            out.site(
                SiteOrigin::YamlTag,
                &method.value,
                method.range,
                SiteOwner::ClassValue(owner.clone()),
                tag.attribute("event").and_then(non_blank).map(str::to_string),
            );
        }
        let tag_location = method.map(|m| out.range(m.range)).unwrap_or(location);
        out.tag_subscription(&tag, &owner, tag_location);
        decl.tags.push(tag);
    }

    for item in body.get("calls").map(YamlNode::items).unwrap_or_default() {
        if let Some(method) = call_method(item) {
            out.site(
                SiteOrigin::YamlCall,
                &method.value,
                method.range,
                SiteOwner::ClassValue(owner.clone()),
                None,
            );
        }
    }

    out.push_arc(Declaration::Service, decl);
}

/// A `tags:` item: `name`, `{ name: n, ... }` or `{ n: { ... } }`.
fn service_tag(item: &YamlNode) -> Option<(ServiceTag, Option<&YamlNode>)> {
    if let Some(name) = item.as_str() {
        return Some((ServiceTag::new(name), None));
    }
    let fields = match item.get_str("name") {
        Some(_) => item,
        None => match item.entries() {
            [single] if matches!(single.value, YamlNode::Mapping(_)) => &single.value,
            _ => return None,
        },
    };
    let name = match item.get_str("name") {
        Some(name) => name,
        None => item.entries().first()?.key.as_str()?,
    };

    let mut tag = ServiceTag::new(name);
    for field in fields.entries() {
        if field.key.value == "name" {
            continue;
        }
        if let Some(value) = field.value.as_scalar() {
            tag.attributes
                .insert(field.key.value.clone(), value.value.clone());
        }
    }
    Some((tag, Some(fields)))
}

/// Method of a `calls:` item: `[method, args]`, `{ method: m }` or `{ m: args }`.
fn call_method(item: &YamlNode) -> Option<&YamlScalar> {
    let method = match item {
        YamlNode::Sequence(parts) => parts.first()?.as_scalar(),
        YamlNode::Mapping(entries) => match item.get("method") {
            Some(method) => method.as_scalar(),
            None => match entries.as_slice() {
                [single] => Some(&single.key),
                _ => None,
            },
        },
        _ => None,
    };
    method.filter(|s| s.as_str().is_some())
}

fn excludes(node: Option<&YamlNode>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    match node {
        Some(YamlNode::Scalar(s)) => out.extend(s.as_str().map(str::to_string)),
        Some(YamlNode::Sequence(items)) => {
            out.extend(items.iter().filter_map(YamlNode::as_str).map(str::to_string));
        }
        _ => {}
    }
    out
}

fn parameter(out: &mut Extraction, entry: &YamlEntry) {
    let Some(name) = entry.key.as_str() else {
        return;
    };
    let location = out.range(entry.key.range);
    out.push_arc(
        Declaration::Parameter,
        ParameterDeclaration {
            name: name.to_string(),
            value: entry.value.as_str().map(str::to_string),
            location,
        },
    );
}

fn route(out: &mut Extraction, entry: &YamlEntry) {
    let Some(name) = entry.key.as_str() else {
        return;
    };
    let body = &entry.value;
    if body.get("resource").is_some() {
        return;
    }
    let controller = body.get_scalar("controller").or_else(|| {
        body.get("defaults")
            .and_then(|d| d.get_scalar("_controller"))
    });
    let path = body.get_str("path");
    if controller.is_none() && path.is_none() {
        return;
    }

    if let Some(scalar) = controller {
        if let Some((owner, method, offset)) = split_controller(&scalar.value) {
            out.site(
                SiteOrigin::RouteController,
                method,
                sub_range(scalar.range, offset, method.len()),
                SiteOwner::ClassValue(owner.to_string()),
                None,
            );
        }
    }

    let location = out.range(entry.key.range);
    out.push_arc(
        Declaration::Route,
        RouteDeclaration {
            name: name.to_string(),
            controller: controller.and_then(YamlScalar::as_str).map(str::to_string),
            path: path.map(str::to_string),
            location,
        },
    );
}
