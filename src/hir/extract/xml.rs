//! XML container and routing files.

use std::collections::BTreeSet;

use crate::syntax::XmlTag;

use super::super::declarations::{
    Declaration, ParameterDeclaration, Prototype, RouteDeclaration, ServiceDeclaration, ServiceTag,
};
use super::{Extraction, SiteOrigin, SiteOwner, split_controller, sub_range};

pub(super) fn extract(out: &mut Extraction, root: &XmlTag) {
    for tag in root.descendants() {
        match tag.name.as_str() {
            "services" => {
                for child in &tag.children {
                    match child.name.as_str() {
                        "service" => service(out, child),
                        "prototype" => prototype(out, child),
                        _ => {}
                    }
                }
            }
            "parameters" => {
                for child in tag.sub_tags("parameter") {
                    parameter(out, child);
                }
            }
            "routes" => {
                for child in tag.sub_tags("route") {
                    route(out, child);
                }
            }
            _ => {}
        }
    }
}

fn service(out: &mut Extraction, tag: &XmlTag) {
    let Some(id_attr) = tag.attribute("id") else {
        return;
    };
    let Some(id) = tag.attribute_value("id") else {
        return;
    };
    let location = out.range(id_attr.value_range);
    let mut decl = ServiceDeclaration::new(id, location);
    decl.class = tag.attribute_value("class").map(str::to_string);
    decl.parent_id = tag.attribute_value("parent").map(str::to_string);
    decl.alias = tag.attribute_value("alias").map(str::to_string);
    decl.is_abstract = tag.attribute_flag("abstract");
    decl.is_synthetic = tag.attribute_flag("synthetic");

    let owner = decl.class.clone().unwrap_or_else(|| id.to_string());

    for child in &tag.children {
        match child.name.as_str() {
            "tag" => {
                let Some(name) = child
                    .attribute_value("name")
                    .or_else(|| child.text_value())
                else {
                    continue;
                };
                let mut service_tag = ServiceTag::new(name);
                for attr in child.attributes.iter().filter(|a| a.name != "name") {
                    service_tag
                        .attributes
                        .insert(attr.name.clone(), attr.value.clone());
                }

                if let Some(method) = child.attribute("method") {
                    out.site(
                        SiteOrigin::XmlTag,
                        &method.value,
                        method.value_range,
                        SiteOwner::ClassValue(owner.clone()),
                        child.attribute_value("event").map(str::to_string),
                    );
                }
                let tag_location = child
                    .attribute("method")
                    .map(|m| out.range(m.value_range))
                    .unwrap_or(location);
                out.tag_subscription(&service_tag, &owner, tag_location);
                decl.tags.push(service_tag);
            }
            "call" => {
                if let Some(method) = child.attribute("method") {
                    out.site(
                        SiteOrigin::XmlCall,
                        &method.value,
                        method.value_range,
                        SiteOwner::ClassValue(owner.clone()),
                        None,
                    );
                }
            }
            _ => {}
        }
    }

    out.push_arc(Declaration::Service, decl);
}

fn prototype(out: &mut Extraction, tag: &XmlTag) {
    let (Some(attr), Some(namespace)) = (tag.attribute("namespace"), tag.attribute_value("namespace"))
    else {
        return;
    };
    let mut exclude = BTreeSet::new();
    if let Some(value) = tag.attribute_value("exclude") {
        exclude.insert(value.to_string());
    }
    for child in tag.sub_tags("exclude") {
        if let Some(value) = child.text_value() {
            exclude.insert(value.to_string());
        }
    }

    let mut decl = ServiceDeclaration::new(namespace, out.range(attr.value_range));
    decl.prototype = Some(Prototype {
        namespace: namespace.trim_end_matches('\\').to_string(),
        resource: tag.attribute_value("resource").map(str::to_string),
        exclude,
    });
    out.push_arc(Declaration::Service, decl);
}

fn parameter(out: &mut Extraction, tag: &XmlTag) {
    let (Some(attr), Some(key)) = (tag.attribute("key"), tag.attribute_value("key")) else {
        return;
    };
    let value = tag
        .text_value()
        .or_else(|| tag.attribute_value("value"))
        .map(str::to_string);
    let location = out.range(attr.value_range);
    out.push_arc(
        Declaration::Parameter,
        ParameterDeclaration {
            name: key.to_string(),
            value,
            location,
        },
    );
}

fn route(out: &mut Extraction, tag: &XmlTag) {
    let (Some(attr), Some(name)) = (tag.attribute("id"), tag.attribute_value("id")) else {
        return;
    };

    let controller = match tag.attribute("controller") {
        Some(c) if !c.value.trim().is_empty() => Some((c.value.trim(), c.value_range)),
        _ => tag
            .sub_tags("default")
            .find(|d| d.attribute_value("key") == Some("_controller"))
            .and_then(|d| d.text.as_ref())
            .filter(|(text, _)| !text.trim().is_empty())
            .map(|(text, range)| (text.trim(), *range)),
    };

    if let Some((value, range)) = controller {
        if let Some((owner, method, offset)) = split_controller(value) {
            out.site(
                SiteOrigin::RouteController,
                method,
                sub_range(range, offset, method.len()),
                SiteOwner::ClassValue(owner.to_string()),
                None,
            );
        }
    }

    let location = out.range(attr.value_range);
    out.push_arc(
        Declaration::Route,
        RouteDeclaration {
            name: name.to_string(),
            controller: controller.map(|(value, _)| value.to_string()),
            path: tag.attribute_value("path").map(str::to_string),
            location,
        },
    );
}
