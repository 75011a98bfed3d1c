//! Leaf value → text policy used by the encoder.
//!
//! The policy is permissive: every value has a text form and nothing here
//! fails. Booleans are lowercase literals, null is the empty string,
//! date-times are ISO-8601, and everything else uses its default string
//! form. Non-scalar values that end up in a text or attribute position are
//! written as compact JSON.

use crate::value::{NodeValue, Scalar};
use chrono::SecondsFormat;
use std::borrow::Cow;

/// Converts a Rust boolean to its string representation for XML.
pub fn bool_to_string(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

/// Returns the text written for a scalar.
pub fn serialize_scalar(value: &Scalar) -> Cow<'_, str> {
    match value {
        Scalar::Bool(b) => Cow::Borrowed(bool_to_string(*b)),
        Scalar::Null => Cow::Borrowed(""),
        Scalar::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Scalar::Timestamp(ts) => Cow::Owned(ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        Scalar::Number(n) => Cow::Owned(n.to_string()),
        Scalar::String(s) => Cow::Borrowed(s.as_str()),
    }
}

/// Returns the text written for any value placed in a text or attribute slot.
pub fn serialize_value(value: &NodeValue) -> Cow<'_, str> {
    match value {
        NodeValue::Scalar(scalar) => serialize_scalar(scalar),
        other => Cow::Owned(other.to_json().to_string()),
    }
}
