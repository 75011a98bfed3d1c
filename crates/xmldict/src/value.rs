//! The dict-side data model.
//!
//! A [`NodeValue`] describes the content of one XML element:
//!
//! | NodeValue | XML |
//! |-----------|-----|
//! | `Scalar("1984")` | `<book>1984</book>` |
//! | `Sequence(["a", "b"])` under key `k` | `<k>a</k><k>b</k>` |
//! | `Map({"@attributes": {"id": 1}, "title": "x"})` | `<book id="1"><title>x</title></book>` |
//!
//! Inside a [`StructuredMap`] the reserved keys [`ATTRIBUTES_KEY`],
//! [`TEXT_KEY`] (alias [`VALUE_KEY`]) and [`CDATA_KEY`] carry attributes and
//! text; every other key names a child element.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

/// Reserved key holding the element's attributes.
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Reserved key holding the element's direct text.
pub const TEXT_KEY: &str = "@text";

/// Accepted alias for [`TEXT_KEY`].
pub const VALUE_KEY: &str = "@value";

/// Reserved key holding text that is always written as a CDATA section.
pub const CDATA_KEY: &str = "@cdata";

/// Returns `true` if `key` is one of the reserved markers rather than a child tag.
pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, ATTRIBUTES_KEY | TEXT_KEY | VALUE_KEY | CDATA_KEY)
}

/// Ordered mapping from child tag or reserved key to value.
pub type StructuredMap = IndexMap<String, NodeValue>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Date-time without an offset, written as `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
    DateTime(NaiveDateTime),
    /// Date-time with an offset, written as RFC 3339.
    Timestamp(DateTime<FixedOffset>),
}

/// The content of one XML element.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Scalar(Scalar),
    Sequence(Vec<NodeValue>),
    Map(StructuredMap),
}

impl NodeValue {
    /// An empty structured map, which encodes to a self-closing element.
    pub fn empty_map() -> Self {
        NodeValue::Map(StructuredMap::new())
    }

    /// A string scalar holding the `Display` form of `value`.
    ///
    /// This is how arbitrary caller types enter the model: whatever they
    /// print as is the text they produce.
    pub fn display(value: impl fmt::Display) -> Self {
        NodeValue::Scalar(Scalar::String(value.to_string()))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, NodeValue::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[NodeValue]> {
        match self {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&StructuredMap> {
        match self {
            NodeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is a structured map.
    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Converts to a `serde_json::Value`.
    ///
    /// Timestamps become ISO-8601 strings. Use this when the caller wants a
    /// plain JSON document instead of the ordered model.
    pub fn to_json(&self) -> JsonValue {
        match self {
            NodeValue::Scalar(scalar) => scalar.to_json(),
            NodeValue::Sequence(items) => {
                JsonValue::Array(items.iter().map(NodeValue::to_json).collect())
            }
            NodeValue::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Scalar {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Scalar::Null => JsonValue::Null,
            Scalar::Bool(b) => JsonValue::Bool(*b),
            Scalar::Number(n) => JsonValue::Number(n.clone()),
            Scalar::String(s) => JsonValue::String(s.clone()),
            Scalar::DateTime(_) | Scalar::Timestamp(_) => {
                JsonValue::String(crate::text::serialize_scalar(self).into_owned())
            }
        }
    }
}

impl From<JsonValue> for NodeValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => NodeValue::Scalar(Scalar::Null),
            JsonValue::Bool(b) => NodeValue::Scalar(Scalar::Bool(b)),
            JsonValue::Number(n) => NodeValue::Scalar(Scalar::Number(n)),
            JsonValue::String(s) => NodeValue::Scalar(Scalar::String(s)),
            JsonValue::Array(items) => {
                NodeValue::Sequence(items.into_iter().map(NodeValue::from).collect())
            }
            JsonValue::Object(map) => NodeValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, NodeValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<NodeValue> for JsonValue {
    fn from(value: NodeValue) -> Self {
        value.to_json()
    }
}

impl From<Scalar> for NodeValue {
    fn from(value: Scalar) -> Self {
        NodeValue::Scalar(value)
    }
}

impl From<StructuredMap> for NodeValue {
    fn from(value: StructuredMap) -> Self {
        NodeValue::Map(value)
    }
}

impl<T: Into<NodeValue>> From<Vec<T>> for NodeValue {
    fn from(items: Vec<T>) -> Self {
        NodeValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NodeValue>> From<Option<T>> for NodeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(NodeValue::Scalar(Scalar::Null), Into::into)
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        NodeValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        NodeValue::Scalar(Scalar::String(value))
    }
}

impl From<bool> for NodeValue {
    fn from(value: bool) -> Self {
        NodeValue::Scalar(Scalar::Bool(value))
    }
}

impl From<NaiveDateTime> for NodeValue {
    fn from(value: NaiveDateTime) -> Self {
        NodeValue::Scalar(Scalar::DateTime(value))
    }
}

impl From<DateTime<FixedOffset>> for NodeValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        NodeValue::Scalar(Scalar::Timestamp(value))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NodeValue {
                fn from(value: $ty) -> Self {
                    NodeValue::Scalar(Scalar::Number(serde_json::Number::from(value)))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<f64> for NodeValue {
    /// Non-finite floats have no JSON number form and fall back to their
    /// `Display` text (`NaN`, `inf`).
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => NodeValue::Scalar(Scalar::Number(n)),
            None => NodeValue::display(value),
        }
    }
}

impl From<f32> for NodeValue {
    fn from(value: f32) -> Self {
        NodeValue::from(f64::from(value))
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::DateTime(_) | Scalar::Timestamp(_) => {
                serializer.serialize_str(&crate::text::serialize_scalar(self))
            }
        }
    }
}

impl Serialize for NodeValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NodeValue::Scalar(scalar) => scalar.serialize(serializer),
            NodeValue::Sequence(items) => items.serialize(serializer),
            NodeValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NodeValue {
    /// Goes through `serde_json::Value`, so any self-describing format works.
    /// Strings stay strings; no attempt is made to recognise timestamps.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(NodeValue::from)
    }
}
