//! XML → node value.
//!
//! Each element decodes to a [`StructuredMap`] holding, in order:
//!
//! 1. `@attributes` with the raw attribute strings, if the element has any;
//! 2. `@text` with the element's direct text (the text before its first
//!    child element), if non-empty;
//! 3. one entry per distinct child tag, in order of first appearance. A tag
//!    seen once maps to its decoded value; a repeated tag maps to a
//!    sequence of decoded values in document order.
//!
//! A map whose only entry is `@text` collapses to the bare text scalar, and
//! an element with nothing at all decodes to an empty map. CDATA sections
//! read back as ordinary text, so `@cdata` is never produced.
//!
//! ```
//! use helios_xmldict::{DecodeOptions, from_xml_str};
//! use serde_json::json;
//!
//! let value = from_xml_str(
//!     r#"<books type="fiction"><book>1984</book><book>Foundation</book></books>"#,
//!     &DecodeOptions::default(),
//! )?;
//! assert_eq!(
//!     value.to_json(),
//!     json!({"@attributes": {"type": "fiction"}, "book": ["1984", "Foundation"]})
//! );
//! # Ok::<(), helios_xmldict::XmlDictError>(())
//! ```

use crate::error::Result;
use crate::reader::{self, ParseOptions};
use crate::tree::XmlElement;
use crate::value::{ATTRIBUTES_KEY, NodeValue, StructuredMap, TEXT_KEY};
use indexmap::IndexMap;
use std::io::Read;
use tracing::{debug, trace};

/// Options for decoding XML text; these are the parser options.
pub type DecodeOptions = ParseOptions;

/// Decodes an element tree into a node value.
pub fn decode(element: &XmlElement) -> NodeValue {
    trace!(element = element.name(), "decoding element");
    let mut result = StructuredMap::new();

    if !element.attributes().is_empty() {
        let attributes = element
            .attributes()
            .iter()
            .map(|(name, value)| (name.clone(), NodeValue::from(value.as_str())))
            .collect();
        result.insert(ATTRIBUTES_KEY.to_string(), NodeValue::Map(attributes));
    }

    if let Some(text) = element.text().filter(|text| !text.is_empty()) {
        result.insert(TEXT_KEY.to_string(), NodeValue::from(text.into_owned()));
    }

    let mut children: IndexMap<&str, Vec<NodeValue>> = IndexMap::new();
    for child in element.children() {
        children.entry(child.name()).or_default().push(decode(child));
    }
    for (tag, mut values) in children {
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            NodeValue::Sequence(values)
        };
        result.insert(tag.to_string(), value);
    }

    if result.len() == 1 {
        if let Some(text) = result.shift_remove(TEXT_KEY) {
            return text;
        }
    }
    NodeValue::Map(result)
}

/// Parse an XML string and decode its root element.
///
/// # Errors
///
/// Returns [`XmlDictError::MalformedXml`](crate::XmlDictError::MalformedXml)
/// if the text is not well-formed.
pub fn from_xml_str(xml: &str, options: &DecodeOptions) -> Result<NodeValue> {
    let root = reader::parse(xml, options)?;
    debug!(root = root.name(), "decoding XML document");
    Ok(decode(&root))
}

/// Parse UTF-8 XML bytes and decode the root element.
pub fn from_xml_slice(xml: &[u8], options: &DecodeOptions) -> Result<NodeValue> {
    from_xml_str(std::str::from_utf8(xml)?, options)
}

/// Read an XML document to the end and decode the root element.
pub fn from_xml_reader<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<NodeValue> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    from_xml_str(&xml, options)
}
