//! [`XmlElement`] tree → XML text, written through quick-xml's `Writer`.

use crate::error::{Result, XmlDictError};
use crate::tree::{XmlElement, XmlNode};
use quick_xml::Writer;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::io::Write;

/// Output formatting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Encoding label written in the XML declaration. Output is always UTF-8,
    /// so only UTF-8 labels are accepted.
    pub encoding: String,
    /// Indent nested elements by two spaces and end with a newline.
    pub pretty_print: bool,
    /// Emit `<?xml version="1.0" encoding="..."?>` before the root element.
    pub xml_declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            pretty_print: true,
            xml_declaration: false,
        }
    }
}

impl WriteOptions {
    /// Unindented output without a declaration.
    pub fn compact() -> Self {
        Self {
            pretty_print: false,
            ..Default::default()
        }
    }
}

/// Serialize an element tree to an XML string.
pub fn element_to_string(element: &XmlElement, options: &WriteOptions) -> Result<String> {
    let buffer = element_to_vec(element, options)?;
    String::from_utf8(buffer).map_err(|e| XmlDictError::Utf8(e.utf8_error()))
}

/// Serialize an element tree to UTF-8 bytes.
pub fn element_to_vec(element: &XmlElement, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_element_to(element, options, &mut buffer)?;
    Ok(buffer)
}

/// Serialize an element tree to a writer.
pub fn write_element_to<W: Write>(
    element: &XmlElement,
    options: &WriteOptions,
    writer: W,
) -> Result<()> {
    check_encoding(&options.encoding)?;

    let mut writer = if options.pretty_print {
        Writer::new_with_indent(writer, b' ', 2)
    } else {
        Writer::new(writer)
    };

    if options.xml_declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some(options.encoding.as_str()),
            None,
        )))?;
        // The indenting writer breaks the line itself before the root element.
        if !options.pretty_print {
            writer.get_mut().write_all(b"\n")?;
        }
    }

    write_element(&mut writer, element)?;

    if options.pretty_print {
        writer.get_mut().write_all(b"\n")?;
    }
    Ok(())
}

fn check_encoding(encoding: &str) -> Result<()> {
    if encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8") {
        Ok(())
    } else {
        Err(XmlDictError::UnsupportedEncoding {
            encoding: encoding.to_string(),
        })
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        let value = escape_attribute(value);
        start.push_attribute(Attribute::from((name.as_bytes(), value.as_bytes())));
    }

    if element.nodes().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in element.nodes() {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => {
                let escaped = escape_whitespace(partial_escape(text), &['\r']);
                writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
            }
            XmlNode::CData(text) => {
                for section in split_cdata(text) {
                    writer.write_event(Event::CData(BytesCData::new(section)))?;
                }
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

/// Escapes an attribute value, writing tabs and line breaks as character
/// references so a reader does not normalize them to spaces.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape_whitespace(escape(value), &['\t', '\n', '\r'])
}

fn escape_whitespace<'a>(escaped: Cow<'a, str>, chars: &[char]) -> Cow<'a, str> {
    if !escaped.contains(chars) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' if chars.contains(&c) => out.push_str("&#9;"),
            '\n' if chars.contains(&c) => out.push_str("&#10;"),
            '\r' if chars.contains(&c) => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Splits text so that no section contains `]]>`; the sections are written
/// as adjacent CDATA blocks and read back as one string.
fn split_cdata(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(index) = rest.find("]]>") {
        sections.push(&rest[..index + 2]);
        rest = &rest[index + 2..];
    }
    sections.push(rest);
    sections
}
