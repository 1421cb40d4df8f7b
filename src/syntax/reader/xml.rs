//! XML reader built on `quick-xml`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::base::TextRange;
use crate::base::range_from_offsets;
use crate::syntax::xml::{XmlAttribute, XmlTag};

use super::ReadError;

/// Read an XML document into its root element.
pub fn read_xml(text: &str) -> Result<XmlTag, ReadError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<(XmlTag, usize)> = Vec::new();
    let mut root: Option<XmlTag> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| ReadError::xml(reader.error_position() as usize, e.to_string()))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let tag = open_tag(text, &e, start, end)?;
                stack.push((tag, start));
            }
            Event::Empty(e) => {
                let tag = open_tag(text, &e, start, end)?;
                attach(&mut stack, &mut root, tag);
            }
            Event::End(_) => {
                let Some((mut tag, tag_start)) = stack.pop() else {
                    return Err(ReadError::xml(start, "unexpected closing tag"));
                };
                tag.range = range_from_offsets(tag_start, end);
                attach(&mut stack, &mut root, tag);
            }
            Event::Text(e) => {
                let value = e
                    .unescape()
                    .map_err(|err| ReadError::xml(start, err.to_string()))?;
                set_text(&mut stack, &text[start..end], value.trim(), start);
            }
            Event::CData(e) => {
                let value = String::from_utf8_lossy(e.as_ref()).into_owned();
                set_text(&mut stack, &text[start..end], value.trim(), start);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((tag, tag_start)) = stack.pop() {
        return Err(ReadError::xml(
            tag_start,
            format!("element <{}> is never closed", tag.name),
        ));
    }

    root.ok_or_else(|| ReadError::xml(0, "document has no root element"))
}

fn open_tag(text: &str, e: &BytesStart<'_>, start: usize, end: usize) -> Result<XmlTag, ReadError> {
    let mut tag = XmlTag::new(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
    tag.range = range_from_offsets(start, end);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| ReadError::xml(start, err.to_string()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ReadError::xml(start, err.to_string()))?
            .into_owned();
        let value_range = locate_attribute_value(text, start, end, &name).unwrap_or_default();
        tag.attributes.push(XmlAttribute {
            name,
            value,
            value_range,
        });
    }

    Ok(tag)
}

fn attach(stack: &mut [(XmlTag, usize)], root: &mut Option<XmlTag>, tag: XmlTag) {
    if let Some((parent, _)) = stack.last_mut() {
        parent.children.push(tag);
    } else if root.is_none() {
        *root = Some(tag);
    }
}

fn set_text(stack: &mut [(XmlTag, usize)], raw: &str, value: &str, start: usize) {
    if value.is_empty() {
        return;
    }
    let Some((parent, _)) = stack.last_mut() else {
        return;
    };
    if parent.text.is_some() {
        return;
    }
    let leading = raw.len() - raw.trim_start().len();
    let trimmed_len = raw.trim().len();
    let range = range_from_offsets(start + leading, start + leading + trimmed_len);
    parent.text = Some((value.to_string(), range));
}

/// Find the range of `name="value"` inside the raw tag text.
fn locate_attribute_value(text: &str, start: usize, end: usize, name: &str) -> Option<TextRange> {
    let tag = &text[start..end];
    let bytes = tag.as_bytes();
    let mut from = 0;

    while let Some(found) = tag[from..].find(name) {
        let at = from + found;
        from = at + name.len();
        if at == 0 || !bytes[at - 1].is_ascii_whitespace() {
            continue;
        }

        let mut i = at + name.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => continue,
        };
        let value_start = i + 1;
        let len = tag[value_start..].find(quote as char)?;
        return Some(range_from_offsets(
            start + value_start,
            start + value_start + len,
        ));
    }

    None
}
