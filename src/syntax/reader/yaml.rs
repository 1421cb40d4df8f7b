//! YAML reader built on `serde_yaml`.
//!
//! `serde_yaml` does not report positions, so scalar ranges are recovered by
//! scanning the source forward in document order for each key and value.
//! Scalars that cannot be located (block scalars, escaped strings) get an
//! empty range at the scan position.

use serde_yaml::Value;

use crate::base::range_from_offsets;
use crate::syntax::yaml::{YamlEntry, YamlNode, YamlScalar};

use super::ReadError;

/// Read a YAML document into a node tree.
pub fn read_yaml(text: &str) -> Result<YamlNode, ReadError> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| ReadError::Yaml(e.to_string()))?;
    let mut locator = Locator { text, cursor: 0 };
    Ok(convert(&value, &mut locator))
}

fn convert(value: &Value, locator: &mut Locator<'_>) -> YamlNode {
    match value {
        Value::Null => YamlNode::Null,
        Value::Bool(b) => YamlNode::Scalar(locator.scalar(&b.to_string())),
        Value::Number(n) => YamlNode::Scalar(locator.scalar(&n.to_string())),
        Value::String(s) => YamlNode::Scalar(locator.scalar(s)),
        Value::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                nodes.push(convert(item, locator));
            }
            YamlNode::Sequence(nodes)
        }
        Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let key = locator.scalar(&key_text(key));
                let value = convert(value, locator);
                entries.push(YamlEntry { key, value });
            }
            YamlNode::Mapping(entries)
        }
        Value::Tagged(tagged) => convert(&tagged.value, locator),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

struct Locator<'a> {
    text: &'a str,
    cursor: usize,
}

impl Locator<'_> {
    fn scalar(&mut self, value: &str) -> YamlScalar {
        let mut scalar = YamlScalar::new(value);
        if value.is_empty() {
            scalar.range = range_from_offsets(self.cursor, self.cursor);
            return scalar;
        }

        match self.text[self.cursor..].find(value) {
            Some(found) => {
                let start = self.cursor + found;
                let end = start + value.len();
                scalar.quoted = start > 0
                    && matches!(self.text.as_bytes()[start - 1], b'\'' | b'"');
                scalar.range = range_from_offsets(start, end);
                self.cursor = end;
            }
            None => {
                scalar.range = range_from_offsets(self.cursor, self.cursor);
            }
        }
        scalar
    }
}
