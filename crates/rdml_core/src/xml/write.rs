//! Element tree to indented RDML text.

use super::{XmlError, XmlResult};
use crate::model::element::Element;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

const INDENT_WIDTH: usize = 2;

/// Serializes `root` with an XML declaration and two-space indentation.
pub fn write_document(root: &Element) -> XmlResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, root)?;

    let mut text = String::from_utf8(writer.into_inner()).map_err(write_error)?;
    text.push('\n');
    Ok(text)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name());
    for attribute in element.attributes() {
        start.push_attribute(attribute);
    }

    let text = element.text().filter(|value| !value.is_empty());
    if text.is_none() && element.children().is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer
        .write_event(Event::Start(start.borrow()))
        .map_err(write_error)?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(start.to_end()))
        .map_err(write_error)
}

fn write_error(err: impl Display) -> XmlError {
    XmlError::Write(err.to_string())
}
