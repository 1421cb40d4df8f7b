//! Declaration extractors.
//!
//! One extractor per syntax turns a host tree into declarations and
//! method-reference sites. Extraction is a pure function of the tree:
//! malformed nodes are skipped and blank values count as absent.

mod php;
mod twig;
mod xml;
mod yaml;

use std::sync::Arc;

use crate::base::{FileId, SourceRange, TextRange, TextSize};
use crate::syntax::{SyntaxFile, non_blank, trim_quotes};

use super::declarations::{
    Declaration, EventSubscription, FileDeclarations, ServiceTag, SubscriptionOrigin,
    listener_method_name,
};

pub use php::default_route_name;

/// Where a method reference was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteOrigin {
    /// `method` of a YAML `tags:` entry.
    YamlTag,
    /// Method of a YAML `calls:` entry.
    YamlCall,
    /// `method` attribute of an XML `<tag>`.
    XmlTag,
    /// `method` attribute of an XML `<call>`.
    XmlCall,
    /// String inside a `getSubscribedEvents()` return array.
    SubscribedEvents,
    /// `method` argument of an event-listener attribute.
    ListenerAttribute,
    /// Method part of a route controller string.
    RouteController,
}

/// The class a referenced method should live on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SiteOwner {
    /// A class value from configuration: a class name, a service id or a
    /// `%parameter%`.
    ClassValue(String),
    /// The fully-qualified PHP class containing the reference.
    Class(String),
}

/// A method reference that must name an existing method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceSite {
    pub origin: SiteOrigin,
    /// Method name with quotes trimmed.
    pub method: String,
    pub range: SourceRange,
    pub owner: SiteOwner,
    /// Event the method listens to, when known.
    pub event: Option<String>,
}

/// Extract declarations and reference sites from one file.
///
/// `path` names templates that do not declare their own logical name.
pub fn extract(file: FileId, path: &str, syntax: &SyntaxFile) -> FileDeclarations {
    let mut out = Extraction::new(file);
    match syntax {
        SyntaxFile::Xml(root) => xml::extract(&mut out, root),
        SyntaxFile::Yaml(root) => yaml::extract(&mut out, root),
        SyntaxFile::Php(php) => php::extract(&mut out, php),
        SyntaxFile::Twig(twig) => twig::extract(&mut out, path, twig),
    }
    out.finish()
}

/// Accumulates one file's output.
pub(crate) struct Extraction {
    file: FileId,
    result: FileDeclarations,
}

impl Extraction {
    fn new(file: FileId) -> Self {
        Self {
            file,
            result: FileDeclarations::default(),
        }
    }

    fn range(&self, range: TextRange) -> SourceRange {
        SourceRange::new(self.file, range)
    }

    fn push(&mut self, declaration: Declaration) {
        self.result.declarations.push(declaration);
    }

    fn push_arc<T>(&mut self, wrap: fn(Arc<T>) -> Declaration, value: T) {
        self.push(wrap(Arc::new(value)));
    }

    fn site(
        &mut self,
        origin: SiteOrigin,
        raw_method: &str,
        range: TextRange,
        owner: SiteOwner,
        event: Option<String>,
    ) {
        let method = trim_quotes(raw_method);
        if method.is_empty() {
            return;
        }
        let range = narrow_to(raw_method, method, range);
        self.result.sites.push(ReferenceSite {
            origin,
            method: method.to_string(),
            range: SourceRange::new(self.file, range),
            owner,
            event,
        });
    }

    /// Record the subscription a tag with an `event` attribute declares.
    fn tag_subscription(&mut self, tag: &ServiceTag, owner: &str, location: SourceRange) {
        let Some(event) = tag.attribute("event").and_then(non_blank) else {
            return;
        };
        let method_name = match tag.attribute("method").and_then(non_blank) {
            Some(method) => trim_quotes(method).to_string(),
            None => listener_method_name(event),
        };
        let priority = tag
            .attribute("priority")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0);
        self.push_arc(
            Declaration::Event,
            EventSubscription {
                event_name: event.to_string(),
                method_name,
                priority,
                owning_class: owner.to_string(),
                origin: SubscriptionOrigin::TagDeclared,
                location,
            },
        );
    }

    fn finish(self) -> FileDeclarations {
        self.result
    }
}

/// Narrow `range` (covering `outer`) to the sub-slice `inner` of `outer`.
///
/// Ranges that do not match the text length are left alone.
fn narrow_to(outer: &str, inner: &str, range: TextRange) -> TextRange {
    if u32::from(range.len()) as usize != outer.len() {
        return range;
    }
    let start = inner.as_ptr() as usize - outer.as_ptr() as usize;
    let start = range.start() + TextSize::from(start as u32);
    TextRange::at(start, TextSize::from(inner.len() as u32))
}

/// Split a controller string into its owner and method parts.
///
/// Accepts `Class::method`, `service::method` and `service:method`. The
/// returned offset is the byte position of the method inside `controller`.
pub(crate) fn split_controller(controller: &str) -> Option<(&str, &str, usize)> {
    let (owner, method, offset) = if let Some(i) = controller.find("::") {
        (&controller[..i], &controller[i + 2..], i + 2)
    } else {
        let i = controller.rfind(':')?;
        (&controller[..i], &controller[i + 1..], i + 1)
    };
    if owner.trim().is_empty() || method.trim().is_empty() {
        return None;
    }
    Some((owner.trim(), method, offset))
}

/// Sub-range of a value range starting at `offset` bytes for `len` bytes.
///
/// Falls back to the whole range when the value range is empty (tree built
/// without positions).
pub(crate) fn sub_range(range: TextRange, offset: usize, len: usize) -> TextRange {
    if range.is_empty() {
        return range;
    }
    let start = range.start() + TextSize::from(offset as u32);
    let end = (start + TextSize::from(len as u32)).min(range.end());
    TextRange::new(start.min(end), end)
}
