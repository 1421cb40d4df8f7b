//! YAML node trees.

use crate::base::TextRange;

use super::non_blank;

/// A scalar value with the range of its text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YamlScalar {
    pub value: String,
    /// Whether the scalar was written with quotes.
    pub quoted: bool,
    /// Range of the value text, excluding quotes.
    pub range: TextRange,
}

impl YamlScalar {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            range: TextRange::default(),
        }
    }

    pub fn at(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }

    /// The value, treating blank scalars as absent.
    pub fn as_str(&self) -> Option<&str> {
        non_blank(&self.value)
    }
}

/// One `key: value` pair of a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlEntry {
    pub key: YamlScalar,
    pub value: YamlNode,
}

/// A YAML node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YamlNode {
    #[default]
    Null,
    Scalar(YamlScalar),
    Sequence(Vec<YamlNode>),
    /// Mapping entries in source order.
    Mapping(Vec<YamlEntry>),
}

impl YamlNode {
    pub fn scalar(value: impl Into<String>) -> Self {
        YamlNode::Scalar(YamlScalar::new(value))
    }

    /// Build a mapping from `(key, value)` pairs.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, YamlNode)>) -> Self {
        YamlNode::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| YamlEntry {
                    key: YamlScalar::new(k),
                    value: v,
                })
                .collect(),
        )
    }

    pub fn sequence(items: impl IntoIterator<Item = YamlNode>) -> Self {
        YamlNode::Sequence(items.into_iter().collect())
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.entries()
            .iter()
            .find(|e| e.key.value == key)
            .map(|e| &e.value)
    }

    /// Mapping entries, or an empty slice for other node kinds.
    pub fn entries(&self) -> &[YamlEntry] {
        match self {
            YamlNode::Mapping(entries) => entries,
            _ => &[],
        }
    }

    /// Sequence items, or an empty slice for other node kinds.
    pub fn items(&self) -> &[YamlNode] {
        match self {
            YamlNode::Sequence(items) => items,
            _ => &[],
        }
    }

    pub fn as_scalar(&self) -> Option<&YamlScalar> {
        match self {
            YamlNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar text, treating blank scalars as absent.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(YamlScalar::as_str)
    }

    /// Scalar child of a mapping, treating blank scalars as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(YamlNode::as_str)
    }

    /// Non-blank scalar child of a mapping, with its range.
    pub fn get_scalar(&self, key: &str) -> Option<&YamlScalar> {
        self.get(key)
            .and_then(YamlNode::as_scalar)
            .filter(|s| s.as_str().is_some())
    }

    /// Scalar interpreted as a YAML boolean.
    pub fn get_flag(&self, key: &str) -> bool {
        matches!(self.get_str(key), Some("true") | Some("yes") | Some("on"))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, YamlNode::Null)
            || matches!(self, YamlNode::Scalar(s) if s.value == "~" || s.value == "null")
    }
}
