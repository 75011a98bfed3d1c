//! # Helios XML Dict
//!
//! Bidirectional mapping between tree-shaped key-value documents and XML.
//!
//! XML semantics are expressed with a handful of reserved keys instead of a
//! DOM API:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `@attributes` | Mapping of attribute names to scalar values |
//! | `@text` (alias `@value`) | The element's text |
//! | `@cdata` | The element's text, written as a CDATA section |
//! | anything else | A child element; a sequence value repeats the element |
//!
//! ## Mapping
//!
//! | Value | XML |
//! |-------|-----|
//! | `{}` | `<books/>` |
//! | `1984` | `<books>1984</books>` |
//! | `{"@attributes": {"year": 2011, "bestseller": true}}` | `<books year="2011" bestseller="true"/>` |
//! | `{"book": ["1984", "Foundation"]}` | `<books><book>1984</book><book>Foundation</book></books>` |
//! | `{"title": {"@cdata": "Foundation"}}` | `<books><title><![CDATA[Foundation]]></title></books>` |
//!
//! The mapping is lossy in one direction. Decoding collapses a map holding
//! only `@text` into the bare text, turns a one-item sequence into a single
//! value, reads CDATA back as `@text`, and returns every scalar as a
//! string.
//!
//! ## Architecture
//!
//! - [`value`]: the [`NodeValue`] data model and its JSON/serde interop.
//! - [`encode`]: value → [`XmlElement`] tree; [`writer`] turns the tree into text.
//! - [`reader`]: text → [`XmlElement`] tree; [`decode`] turns the tree into a value.
//! - [`text`]: the scalar → text policy used by the encoder.
//!
//! Every call builds its own tree and keeps no state, so conversions on
//! different threads never interact. Progress is reported through
//! `tracing` events; they cost nothing unless the caller installs a
//! subscriber.
//!
//! ## Example
//!
//! ```
//! use helios_xmldict::{DecodeOptions, EncodeOptions, NodeValue, from_xml_str, to_xml_string};
//! use serde_json::json;
//!
//! let value = NodeValue::from(json!({
//!     "@attributes": {"type": "fiction"},
//!     "book": [
//!         {"@attributes": {"author": "George Orwell"}, "title": "1984"},
//!         {"@attributes": {"author": "Isaac Asimov"}, "title": {"@cdata": "Foundation"}}
//!     ]
//! }));
//!
//! let xml = to_xml_string("books", &value, &EncodeOptions::default())?;
//! let decoded = from_xml_str(&xml, &DecodeOptions::default())?;
//!
//! assert_eq!(
//!     decoded.to_json(),
//!     json!({
//!         "@attributes": {"type": "fiction"},
//!         "book": [
//!             {"@attributes": {"author": "George Orwell"}, "title": "1984"},
//!             {"@attributes": {"author": "Isaac Asimov"}, "title": "Foundation"}
//!         ]
//!     })
//! );
//! # Ok::<(), helios_xmldict::XmlDictError>(())
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod reader;
pub mod text;
pub mod tree;
pub mod value;
pub mod writer;

mod utils;

pub use error::{Result, XmlDictError};
pub use value::{
    ATTRIBUTES_KEY, CDATA_KEY, NodeValue, Scalar, StructuredMap, TEXT_KEY, VALUE_KEY,
};
pub use tree::{XmlElement, XmlNode};

pub use encode::{EncodeOptions, encode, to_xml_string, to_xml_vec, to_xml_writer};
pub use decode::{DecodeOptions, decode, from_xml_reader, from_xml_slice, from_xml_str};
pub use reader::{ParseOptions, parse};
pub use writer::{WriteOptions, element_to_string, element_to_vec, write_element_to};
