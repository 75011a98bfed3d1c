//! Node value → XML.
//!
//! The encoder walks a [`NodeValue`] depth-first and builds the element tree
//! top-down:
//!
//! - A **scalar** becomes the element's text.
//! - A **structured map** applies `@attributes`, then `@value`/`@text`, then
//!   `@cdata` (so CDATA wins when both text keys are present), then appends
//!   one child per remaining key in map order.
//! - A **sequence** under key `k` appends one `<k>` sibling per item to the
//!   parent. The shape is inspected before any element is created, so no
//!   placeholder element is ever built and discarded. Nested sequences
//!   flatten into further siblings; an empty sequence appends nothing.
//!
//! The caller's value is only borrowed. Reserved keys are skipped when
//! children are appended, so they never appear as elements.
//!
//! ## Example
//!
//! ```
//! use helios_xmldict::{EncodeOptions, NodeValue, to_xml_string};
//! use serde_json::json;
//!
//! let books = NodeValue::from(json!({
//!     "@attributes": {"type": "fiction"},
//!     "book": ["1984", "Foundation"]
//! }));
//! let xml = to_xml_string("books", &books, &EncodeOptions::default().with_pretty_print(false))?;
//! assert_eq!(xml, r#"<books type="fiction"><book>1984</book><book>Foundation</book></books>"#);
//! # Ok::<(), helios_xmldict::XmlDictError>(())
//! ```

use crate::error::{Result, XmlDictError};
use crate::text::{serialize_scalar, serialize_value};
use crate::tree::XmlElement;
use crate::utils;
use crate::value::{
    ATTRIBUTES_KEY, CDATA_KEY, NodeValue, Scalar, StructuredMap, TEXT_KEY, VALUE_KEY,
    is_reserved_key,
};
use crate::writer::{self, WriteOptions};
use std::borrow::Cow;
use std::io::Write;
use tracing::{debug, trace};

/// Options for encoding a value to XML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write every text payload as CDATA, not only explicit `@cdata` entries.
    pub force_cdata: bool,
    /// Output formatting, passed through to the writer.
    pub write: WriteOptions,
}

impl EncodeOptions {
    pub fn with_force_cdata(mut self, force_cdata: bool) -> Self {
        self.force_cdata = force_cdata;
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.write.pretty_print = pretty_print;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.write.xml_declaration = xml_declaration;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.write.encoding = encoding.into();
        self
    }
}

/// Builds the element tree for `value` under a root element named `root_name`.
///
/// # Errors
///
/// - [`XmlDictError::UnsupportedRootShape`] if `value` is a sequence.
/// - [`XmlDictError::InvalidName`] if the root name, a child key or an
///   attribute name is not a valid XML name.
/// - [`XmlDictError::InvalidAttributes`] if an `@attributes` entry is not a map.
pub fn encode(root_name: &str, value: &NodeValue, options: &EncodeOptions) -> Result<XmlElement> {
    debug!(
        root = root_name,
        force_cdata = options.force_cdata,
        "encoding value"
    );
    let encoder = Encoder {
        force_cdata: options.force_cdata,
    };
    let mut root = new_element(root_name)?;
    encoder.fill(&mut root, value)?;
    Ok(root)
}

/// Encode a value and serialize it to an XML string.
pub fn to_xml_string(root_name: &str, value: &NodeValue, options: &EncodeOptions) -> Result<String> {
    let root = encode(root_name, value, options)?;
    let xml = writer::element_to_string(&root, &options.write)?;
    debug!(root = root_name, bytes = xml.len(), "encoded XML document");
    Ok(xml)
}

/// Encode a value and serialize it to UTF-8 bytes.
pub fn to_xml_vec(root_name: &str, value: &NodeValue, options: &EncodeOptions) -> Result<Vec<u8>> {
    let root = encode(root_name, value, options)?;
    writer::element_to_vec(&root, &options.write)
}

/// Encode a value and serialize it to a writer.
pub fn to_xml_writer<W: Write>(
    root_name: &str,
    value: &NodeValue,
    options: &EncodeOptions,
    writer: W,
) -> Result<()> {
    let root = encode(root_name, value, options)?;
    writer::write_element_to(&root, &options.write, writer)
}

fn new_element(name: &str) -> Result<XmlElement> {
    if !utils::is_valid_name(name) {
        return Err(XmlDictError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(XmlElement::new(name))
}

struct Encoder {
    force_cdata: bool,
}

impl Encoder {
    /// Fills an already created element with the content described by `value`.
    fn fill(&self, element: &mut XmlElement, value: &NodeValue) -> Result<()> {
        match value {
            NodeValue::Scalar(scalar) => {
                self.set_text(element, serialize_scalar(scalar));
                Ok(())
            }
            NodeValue::Map(map) => self.fill_map(element, map),
            // Children never reach here: `append` expands sequences into
            // siblings first. Only a root-level sequence does.
            NodeValue::Sequence(_) => Err(XmlDictError::UnsupportedRootShape {
                root: element.name().to_string(),
            }),
        }
    }

    fn fill_map(&self, element: &mut XmlElement, map: &StructuredMap) -> Result<()> {
        if let Some(attributes) = map.get(ATTRIBUTES_KEY) {
            trace!(element = element.name(), "applying @attributes");
            match attributes {
                NodeValue::Map(attributes) => {
                    for (name, value) in attributes {
                        if !utils::is_valid_name(name) {
                            return Err(XmlDictError::InvalidName { name: name.clone() });
                        }
                        element.set_attribute(name.as_str(), serialize_value(value).into_owned());
                    }
                }
                NodeValue::Scalar(Scalar::Null) => {}
                _ => {
                    return Err(XmlDictError::InvalidAttributes {
                        element: element.name().to_string(),
                    });
                }
            }
        }

        // The alias goes first so the canonical key wins when both are present.
        for key in [VALUE_KEY, TEXT_KEY] {
            if let Some(text) = map.get(key) {
                trace!(element = element.name(), key, "applying text");
                self.set_text(element, serialize_value(text));
            }
        }

        if let Some(cdata) = map.get(CDATA_KEY) {
            trace!(element = element.name(), "applying @cdata");
            element.set_cdata(serialize_value(cdata).into_owned());
        }

        for (key, value) in map.iter().filter(|(key, _)| !is_reserved_key(key)) {
            self.append(element, key, value)?;
        }
        Ok(())
    }

    /// Appends the element(s) for `key` to `parent`.
    fn append(&self, parent: &mut XmlElement, key: &str, value: &NodeValue) -> Result<()> {
        match value {
            NodeValue::Sequence(items) => {
                trace!(parent = parent.name(), key, count = items.len(), "expanding sequence");
                for item in items {
                    self.append(parent, key, item)?;
                }
            }
            _ => {
                trace!(parent = parent.name(), key, "creating child element");
                let mut child = new_element(key)?;
                self.fill(&mut child, value)?;
                parent.append_child(child);
            }
        }
        Ok(())
    }

    fn set_text(&self, element: &mut XmlElement, text: Cow<'_, str>) {
        if self.force_cdata {
            element.set_cdata(text.into_owned());
        } else {
            element.set_text(text.into_owned());
        }
    }
}
