//! XML text → [`XmlElement`] tree, driven by quick-xml's event reader.
//!
//! The reader keeps a stack of open elements; each end tag pops the top of
//! the stack and attaches it to its parent. Comments, processing
//! instructions, the XML declaration and DOCTYPE carry no data for the
//! dict mapping and are skipped.

use crate::error::{Result, XmlDictError};
use crate::tree::{XmlElement, XmlNode};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::str;
use tracing::trace;

/// Options controlling how XML text is turned into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop namespace declarations that repeat a binding already in scope.
    pub namespace_clean: bool,
    /// Drop whitespace-only text in elements that also have child elements.
    pub strip_blank_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            namespace_clean: true,
            strip_blank_text: true,
        }
    }
}

/// Parses a complete XML document and returns its root element.
///
/// # Errors
///
/// Returns [`XmlDictError::MalformedXml`] if the document is not well-formed:
/// mismatched or unclosed tags, duplicate attributes, unknown entities,
/// text outside the root element, or zero or several root elements.
pub fn parse(xml: &str, options: &ParseOptions) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::new(*options);
    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlDictError::malformed_at(reader.error_position(), e))?;
        match event {
            Event::Start(start) => builder.open(&start)?,
            Event::Empty(start) => {
                builder.open(&start)?;
                builder.close()?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(text) => builder.text(str::from_utf8(&text)?)?,
            Event::CData(cdata) => builder.cdata(str::from_utf8(&cdata)?)?,
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(str::from_utf8(&reference)?)?;
                builder.append_text(resolved)?;
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    builder.finish()
}

/// Resolves the body of an entity or character reference (`amp`, `#38`, `#x26`).
fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let code_point = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        }
        .map_err(|_| XmlDictError::malformed(format!("invalid character reference &{};", name)))?;
        return char::from_u32(code_point)
            .filter(|&c| is_xml_char(c))
            .map(String::from)
            .ok_or_else(|| {
                XmlDictError::malformed(format!("invalid character reference &{};", name))
            });
    }

    let resolved = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ => {
            return Err(XmlDictError::malformed(format!(
                "unknown entity &{};",
                name
            )));
        }
    };
    Ok(resolved.to_string())
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Normalizes a raw attribute value and resolves its references.
///
/// Literal tabs and line breaks become spaces (a `\r\n` pair becomes one
/// space); characters written as references are kept as written.
fn attribute_value(raw: &str) -> Result<String> {
    let mut value = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find(['&', '\t', '\n', '\r']) {
        value.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(reference) = tail.strip_prefix('&') {
            let end = reference.find(';').ok_or_else(|| {
                XmlDictError::malformed(format!("unterminated reference in attribute value {:?}", raw))
            })?;
            value.push_str(&resolve_reference(&reference[..end])?);
            rest = &reference[end + 1..];
        } else {
            value.push(' ');
            rest = tail.strip_prefix("\r\n").unwrap_or(&tail[1..]);
        }
    }
    value.push_str(rest);
    Ok(value)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// An element under construction plus the number of namespace bindings it declared.
struct OpenElement {
    element: XmlElement,
    bindings: usize,
}

struct TreeBuilder {
    options: ParseOptions,
    stack: Vec<OpenElement>,
    /// In-scope namespace bindings as (prefix, uri); the default namespace has prefix "".
    namespaces: Vec<(String, String)>,
    root: Option<XmlElement>,
}

impl TreeBuilder {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            namespaces: Vec::new(),
            root: None,
        }
    }

    fn in_scope(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XmlDictError::malformed(
                "document has more than one root element",
            ));
        }

        let qname = start.name();
        let name = str::from_utf8(qname.as_ref())?;
        let mut element = XmlElement::new(name);
        let mut bindings = 0;

        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                XmlDictError::malformed(format!("bad attribute on <{}>: {}", name, e))
            })?;
            let key = str::from_utf8(attr.key.as_ref())?;
            let value = attribute_value(str::from_utf8(&attr.value)?)?;

            let prefix = if key == "xmlns" {
                Some("")
            } else {
                key.strip_prefix("xmlns:")
            };
            if let Some(prefix) = prefix {
                if self.options.namespace_clean && self.in_scope(prefix) == Some(value.as_str()) {
                    trace!(element = name, declaration = key, "dropping redundant namespace declaration");
                    continue;
                }
                self.namespaces.push((prefix.to_string(), value.clone()));
                bindings += 1;
            }

            element.set_attribute(key, value);
        }

        self.stack.push(OpenElement { element, bindings });
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let OpenElement {
            mut element,
            bindings,
        } = self
            .stack
            .pop()
            .ok_or_else(|| XmlDictError::malformed("end tag without a matching start tag"))?;

        let retained = self.namespaces.len() - bindings;
        self.namespaces.truncate(retained);

        if self.options.strip_blank_text {
            element.strip_blank_text();
        }

        match self.stack.last_mut() {
            Some(parent) => parent.element.append_child(element),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() && is_blank(text) {
            return Ok(());
        }
        let text = if text.contains('\r') {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text.to_string()
        };
        self.append_text(text)
    }

    /// Appends text that needs no line-ending normalization, such as a
    /// resolved character reference.
    fn append_text(&mut self, text: String) -> Result<()> {
        let open = self.stack.last_mut().ok_or_else(|| {
            XmlDictError::malformed("text content outside the root element")
        })?;

        // Entity references arrive as separate events; keep a run of text in one node.
        if let Some(XmlNode::Text(last)) = open.element.nodes_mut().last_mut() {
            last.push_str(&text);
        } else {
            open.element.push_node(XmlNode::Text(text));
        }
        Ok(())
    }

    fn cdata(&mut self, text: &str) -> Result<()> {
        let open = self.stack.last_mut().ok_or_else(|| {
            XmlDictError::malformed("CDATA section outside the root element")
        })?;
        open.element.push_node(XmlNode::CData(text.to_string()));
        Ok(())
    }

    fn finish(self) -> Result<XmlElement> {
        if let Some(open) = self.stack.last() {
            return Err(XmlDictError::malformed(format!(
                "unclosed element <{}>",
                open.element.name()
            )));
        }
        self.root
            .ok_or_else(|| XmlDictError::malformed("document has no root element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(xml: &str) -> Result<XmlElement> {
        parse(xml, &ParseOptions::default())
    }

    #[test]
    fn test_parse_nested_elements() -> Result<()> {
        let root = parse_default(
            r#"<books type="fiction"><book>1984</book><book>Foundation</book></books>"#,
        )?;
        assert_eq!(root.name(), "books");
        assert_eq!(root.attribute("type"), Some("fiction"));
        let titles: Vec<String> = root
            .children()
            .map(|c| c.text().unwrap_or_default().into_owned())
            .collect();
        assert_eq!(titles, vec!["1984", "Foundation"]);
        Ok(())
    }

    #[test]
    fn test_parse_skips_prolog_and_comments() -> Result<()> {
        let root = parse_default(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- list -->\n<books><?pi x?><book/></books>\n",
        )?;
        assert_eq!(root.children().count(), 1);
        assert!(root.text().is_none());
        Ok(())
    }

    #[test]
    fn test_parse_resolves_references() -> Result<()> {
        let root = parse_default(r#"<t a="x &amp; y">&lt;b&gt; &#65;&#x42; &quot;q&apos;</t>"#)?;
        assert_eq!(root.attribute("a"), Some("x & y"));
        assert_eq!(root.text().as_deref(), Some("<b> AB \"q'"));
        assert_eq!(root.nodes().len(), 1);
        Ok(())
    }

    #[test]
    fn test_attribute_whitespace_is_normalized() -> Result<()> {
        let root = parse_default("<r a=\"x\ny\" b=\"1\t2\r\n3\" c=\"keep&#10;&#9;this\"/>")?;
        assert_eq!(root.attribute("a"), Some("x y"));
        assert_eq!(root.attribute("b"), Some("1 2 3"));
        assert_eq!(root.attribute("c"), Some("keep\n\tthis"));
        Ok(())
    }

    #[test]
    fn test_parse_cdata() -> Result<()> {
        let root = parse_default("<title><![CDATA[<Foundation>]]></title>")?;
        assert_eq!(root.nodes(), &[XmlNode::CData("<Foundation>".to_string())]);
        Ok(())
    }

    #[test]
    fn test_blank_text_between_children_is_stripped() -> Result<()> {
        let root = parse_default("<books>\n  <book>x</book>\n</books>")?;
        assert!(root.text().is_none());

        let kept = parse(
            "<books>\n  <book>x</book>\n</books>",
            &ParseOptions {
                strip_blank_text: false,
                ..Default::default()
            },
        )?;
        assert_eq!(kept.text().as_deref(), Some("\n  "));
        Ok(())
    }

    #[test]
    fn test_leaf_whitespace_is_kept() -> Result<()> {
        let root = parse_default("<a>   </a>")?;
        assert_eq!(root.text().as_deref(), Some("   "));
        Ok(())
    }

    #[test]
    fn test_line_endings_are_normalized() -> Result<()> {
        let root = parse_default("<a>one\r\ntwo\rthree</a>")?;
        assert_eq!(root.text().as_deref(), Some("one\ntwo\nthree"));

        let escaped = parse_default("<a>one&#13;\ntwo</a>")?;
        assert_eq!(escaped.text().as_deref(), Some("one\r\ntwo"));
        Ok(())
    }

    #[test]
    fn test_namespace_clean_drops_redundant_declarations() -> Result<()> {
        let xml = r#"<r xmlns="urn:a" xmlns:p="urn:p"><c xmlns="urn:a" xmlns:p="urn:other"/></r>"#;
        let root = parse_default(xml)?;
        assert_eq!(root.attribute("xmlns"), Some("urn:a"));
        let child = root.children().next().unwrap();
        assert_eq!(child.attribute("xmlns"), None);
        assert_eq!(child.attribute("xmlns:p"), Some("urn:other"));

        let raw = parse(
            xml,
            &ParseOptions {
                namespace_clean: false,
                ..Default::default()
            },
        )?;
        let child = raw.children().next().unwrap();
        assert_eq!(child.attribute("xmlns"), Some("urn:a"));
        Ok(())
    }

    #[test]
    fn test_namespace_scope_ends_with_element() -> Result<()> {
        let root = parse_default(r#"<r><a xmlns="urn:a"/><b xmlns="urn:a"/></r>"#)?;
        for child in root.children() {
            assert_eq!(child.attribute("xmlns"), Some("urn:a"));
        }
        Ok(())
    }

    #[test]
    fn test_prefixed_names_are_kept() -> Result<()> {
        let root = parse_default(r#"<x:r xmlns:x="urn:x"><x:c x:a="1"/></x:r>"#)?;
        assert_eq!(root.name(), "x:r");
        let child = root.children().next().unwrap();
        assert_eq!(child.name(), "x:c");
        assert_eq!(child.attribute("x:a"), Some("1"));
        Ok(())
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "<a><b></a>",
            "<a>",
            "",
            "   ",
            "<a/><b/>",
            "text<a/>",
            "<a>&unknown;</a>",
            r#"<a x="1" x="2"/>"#,
            "<a></a></b>",
            "<a>&#0;</a>",
            "<a>&#1;</a>",
            "<a>&#xFFFE;</a>",
            r#"<a x="&#0;"/>"#,
        ];
        for xml in cases {
            let result = parse_default(xml);
            assert!(
                matches!(result, Err(XmlDictError::MalformedXml { .. })),
                "expected MalformedXml for {:?}, got {:?}",
                xml,
                result
            );
        }
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("amp").unwrap(), "&");
        assert_eq!(resolve_reference("#x263A").unwrap(), "\u{263A}");
        assert_eq!(resolve_reference("#169").unwrap(), "\u{a9}");
        assert_eq!(resolve_reference("#9").unwrap(), "\t");
        assert_eq!(resolve_reference("#x10000").unwrap(), "\u{10000}");
        assert!(resolve_reference("#xD800").is_err());
        assert!(resolve_reference("#0").is_err());
        assert!(resolve_reference("#1").is_err());
        assert!(resolve_reference("#xFFFE").is_err());
        assert!(resolve_reference("#x1F").is_err());
        assert!(resolve_reference("nbsp").is_err());
    }
}
