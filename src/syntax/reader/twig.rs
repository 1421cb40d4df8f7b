//! Twig tag scanner.
//!
//! Only `{% ... %}` tags are looked at; expressions, text and comments are
//! skipped. Template references that are not string literals (variables,
//! conditionals) are ignored.

use crate::base::range_from_offsets;
use crate::syntax::twig::{TemplateRef, TwigBlockTag, TwigFile};

use super::ReadError;

pub fn read_twig(text: &str) -> Result<TwigFile, ReadError> {
    let mut file = TwigFile::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find('{') {
        let start = pos + found;
        let rest = &text[start..];

        if rest.starts_with("{#") {
            let end = rest
                .find("#}")
                .ok_or_else(|| ReadError::twig(start, "unterminated comment"))?;
            pos = start + end + 2;
            continue;
        }

        if !rest.starts_with("{%") {
            pos = start + 1;
            continue;
        }

        let end = rest
            .find("%}")
            .ok_or_else(|| ReadError::twig(start, "unterminated tag"))?;
        let body_start = start + 2;
        let body_end = start + end;
        scan_tag(text, body_start, body_end, &mut file);
        pos = body_end + 2;
    }

    Ok(file)
}

fn scan_tag(text: &str, start: usize, end: usize, file: &mut TwigFile) {
    let mut cursor = Cursor { text, pos: start, end };
    cursor.skip_char('-');
    cursor.skip_ws();

    let Some((keyword, _)) = cursor.word() else {
        return;
    };

    match keyword {
        "block" => {
            cursor.skip_ws();
            if let Some((name, range)) = cursor.word() {
                file.blocks.push(TwigBlockTag {
                    name: name.to_string(),
                    range,
                });
            }
        }
        "extends" | "embed" | "use" | "include" => {
            cursor.skip_ws();
            let Some(template) = cursor.string_literal() else {
                return;
            };
            match keyword {
                "extends" => file.extends.push(template),
                "embed" => file.embeds.push(template),
                "use" => file.uses.push(template),
                _ => file.includes.push(template),
            }
        }
        _ => {}
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        if self.pos < self.end {
            Some(self.text.as_bytes()[self.pos])
        } else {
            None
        }
    }

    fn skip_char(&mut self, c: char) {
        if self.peek() == Some(c as u8) {
            self.pos += 1;
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> Option<(&'a str, crate::base::TextRange)> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some((
            &self.text[start..self.pos],
            range_from_offsets(start, self.pos),
        ))
    }

    fn string_literal(&mut self) -> Option<TemplateRef> {
        let quote = self.peek().filter(|b| *b == b'\'' || *b == b'"')?;
        let start = self.pos + 1;
        let len = self.text[start..self.end].find(quote as char)?;
        let value = &self.text[start..start + len];
        self.pos = start + len + 1;
        if value.trim().is_empty() {
            return None;
        }
        Some(TemplateRef {
            name: value.to_string(),
            range: range_from_offsets(start, start + len),
        })
    }
}
