//! RDML text to element tree.

use super::{XmlError, XmlResult};
use crate::model::element::{Element, SourcePosition};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use regex::Regex;

static ENTITY_DECLARATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\W*!ENTITY[^>]+>").expect("valid entity declaration regex"));
static ENTITY_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!ENTITY").expect("valid entity keyword regex"));

/// Removes `<!ENTITY ...>` declarations and stray `!ENTITY` keywords.
pub fn strip_entity_declarations(data: &str) -> String {
    let without_declarations = ENTITY_DECLARATION_RE.replace_all(data, "");
    ENTITY_KEYWORD_RE
        .replace_all(&without_declarations, "")
        .into_owned()
}

/// Parses RDML text into its root element.
///
/// Element start positions are recorded so validation diagnostics can point
/// at the source line and column.
///
/// # Errors
/// - `XmlError::Syntax` for malformed input, unbound prefixes, a missing root
///   or content after the root element.
pub fn parse_document(data: &str) -> XmlResult<Element> {
    let cleaned = strip_entity_declarations(data);
    let lines = LineIndex::new(&cleaned);
    let mut reader = NsReader::from_str(&cleaned);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let (namespace, event) = match reader.read_resolved_event() {
            Ok(resolved) => resolved,
            Err(err) => return Err(lines.syntax_error(offset, err.to_string())),
        };

        match event {
            Event::Start(start) => {
                let element = open_element(&namespace, &start, lines.position(offset))
                    .map_err(|message| lines.syntax_error(offset, message))?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&namespace, &start, lines.position(offset))
                    .map_err(|message| lines.syntax_error(offset, message))?;
                close_element(&mut stack, &mut root, element)
                    .map_err(|message| lines.syntax_error(offset, message))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| lines.syntax_error(offset, "unexpected closing tag".into()))?;
                close_element(&mut stack, &mut root, element)
                    .map_err(|message| lines.syntax_error(offset, message))?;
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|err| lines.syntax_error(offset, err.to_string()))?;
                append_text(&mut stack, &value);
            }
            Event::CData(data) => {
                append_text(&mut stack, &String::from_utf8_lossy(&data));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(lines.syntax_error(
            cleaned.len(),
            format!("element `{}` is not closed", open.name()),
        ));
    }
    root.ok_or_else(|| lines.syntax_error(0, "document has no root element".into()))
}

fn open_element(
    namespace: &ResolveResult<'_>,
    start: &BytesStart<'_>,
    position: SourcePosition,
) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let namespace = match namespace {
        ResolveResult::Bound(bound) => Some(String::from_utf8_lossy(bound.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(format!(
                "namespace prefix `{}` is not declared",
                String::from_utf8_lossy(prefix)
            ));
        }
    };

    let mut element = Element::new(name, namespace.as_deref());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(|err| err.to_string())?;
        element.set_attribute(&key, value.into_owned());
    }
    element.set_position(Some(position));
    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), String> {
    // Whitespace around child elements is indentation; leaf text stays exact.
    let indentation_only = !element.children().is_empty()
        && element.text().is_some_and(|text| text.trim().is_empty());
    if indentation_only {
        element.set_text(None);
    }
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!(
            "element `{}` follows the root element",
            element.name()
        ));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [Element], value: &str) {
    // Text outside the root element is not part of the tree.
    let Some(current) = stack.last_mut() else {
        return;
    };
    let text = match current.text() {
        Some(existing) => format!("{existing}{value}"),
        None => value.to_string(),
    };
    current.set_text(Some(text));
}

/// Byte offset to line/column lookup.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Position of the first non-whitespace byte at or after `offset`.
    fn position(&self, offset: usize) -> SourcePosition {
        let bytes = self.source.as_bytes();
        let mut offset = offset.min(bytes.len());
        while offset < bytes.len() && bytes[offset].is_ascii_whitespace() {
            offset += 1;
        }
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        SourcePosition {
            line,
            column: offset - line_start + 1,
        }
    }

    fn syntax_error(&self, offset: usize, message: String) -> XmlError {
        let position = self.position(offset);
        XmlError::Syntax {
            line: position.line,
            column: position.column,
            message,
        }
    }
}
