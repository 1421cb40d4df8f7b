//! XML element trees.

use crate::base::TextRange;

use super::non_blank;

/// An attribute on an XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
    /// Range of the value text, excluding the surrounding quotes.
    pub value_range: TextRange,
}

/// An XML element with its attributes, child elements and text content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlTag {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlTag>,
    /// Trimmed text content and its range, if any.
    pub text: Option<(String, TextRange)>,
    pub range: TextRange,
}

impl XmlTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            name: name.into(),
            value: value.into(),
            value_range: TextRange::default(),
        });
        self
    }

    pub fn with_child(mut self, child: XmlTag) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some((text.into(), TextRange::default()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute value, treating blank values as absent.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| non_blank(&a.value))
    }

    /// Attribute parsed as an XML boolean (`true`/`1`).
    pub fn attribute_flag(&self, name: &str) -> bool {
        matches!(self.attribute_value(name), Some("true") | Some("1"))
    }

    /// Direct children with the given element name.
    pub fn sub_tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlTag> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content, treating blank text as absent.
    pub fn text_value(&self) -> Option<&str> {
        self.text.as_ref().and_then(|(t, _)| non_blank(t))
    }

    /// Depth-first iteration over this element and all descendants.
    pub fn descendants(&self) -> Vec<&XmlTag> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(tag) = stack.pop() {
            out.push(tag);
            for child in tag.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}
