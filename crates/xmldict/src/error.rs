//! Error types for dict ↔ XML conversion.
//!
//! Every conversion is all-or-nothing: a call either returns a fully
//! converted result or one of the errors below. Nothing here is recovered
//! internally.

use thiserror::Error;

/// Errors raised while encoding a [`NodeValue`](crate::NodeValue) to XML or
/// decoding XML back into one.
#[derive(Debug, Error)]
pub enum XmlDictError {
    /// The input text is not well-formed XML.
    #[error("malformed XML: {message}")]
    MalformedXml {
        /// Description of the parse failure, including the byte position when known.
        message: String,
    },

    /// A sequence was supplied as the root value; there is no parent element
    /// to hold the repeated siblings.
    #[error("a sequence cannot be encoded as the root element '{root}'")]
    UnsupportedRootShape {
        /// The root element name that was requested.
        root: String,
    },

    /// An element or attribute name is not a valid XML name.
    #[error("invalid XML name: '{name}'")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// The `@attributes` entry of an element is not a mapping.
    #[error("@attributes of <{element}> must be a mapping of names to scalars")]
    InvalidAttributes {
        /// The element carrying the bad `@attributes` entry.
        element: String,
    },

    /// Only UTF-8 output is produced.
    #[error("unsupported output encoding: {encoding}")]
    UnsupportedEncoding {
        /// The requested encoding label.
        encoding: String,
    },

    /// Input bytes are not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// I/O error while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl XmlDictError {
    /// Builds a [`XmlDictError::MalformedXml`] from any displayable parser error.
    pub fn malformed(message: impl std::fmt::Display) -> Self {
        XmlDictError::MalformedXml {
            message: message.to_string(),
        }
    }

    /// Builds a [`XmlDictError::MalformedXml`] that records where parsing stopped.
    pub(crate) fn malformed_at(position: u64, message: impl std::fmt::Display) -> Self {
        XmlDictError::MalformedXml {
            message: format!("{} (at byte {})", message, position),
        }
    }
}

impl From<quick_xml::Error> for XmlDictError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => XmlDictError::Io(std::io::Error::new(io.kind(), io)),
            other => XmlDictError::malformed(other),
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, XmlDictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = XmlDictError::malformed("unexpected end of input");
        assert_eq!(err.to_string(), "malformed XML: unexpected end of input");
    }

    #[test]
    fn test_malformed_at_includes_position() {
        let err = XmlDictError::malformed_at(17, "mismatched end tag");
        assert_eq!(
            err.to_string(),
            "malformed XML: mismatched end tag (at byte 17)"
        );
    }

    #[test]
    fn test_root_shape_display() {
        let err = XmlDictError::UnsupportedRootShape {
            root: "books".to_string(),
        };
        assert!(err.to_string().contains("'books'"));
    }
}
