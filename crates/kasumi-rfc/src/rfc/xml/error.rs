//! xCal / xCard reader and writer errors.

use std::fmt;

use crate::error::{ValueError, ValueErrorKind};

/// Result type for the XML encodings.
pub type XmlResult<T> = Result<T, XmlError>;

/// An error reading or writing xCal / xCard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub kind: XmlErrorKind,
    pub message: String,
}

impl XmlError {
    #[must_use]
    pub fn new(kind: XmlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Malformed XML.
    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::new(XmlErrorKind::Xml, message)
    }

    #[must_use]
    pub fn missing_element(name: &str) -> Self {
        Self::new(
            XmlErrorKind::MissingElement,
            format!("missing required element: {name}"),
        )
    }

    #[must_use]
    pub fn unexpected_element(name: &str) -> Self {
        Self::new(
            XmlErrorKind::UnexpectedElement,
            format!("unexpected element: {name}"),
        )
    }

    #[must_use]
    pub fn unsupported_namespace(ns: &str) -> Self {
        Self::new(
            XmlErrorKind::UnsupportedNamespace,
            format!("unsupported namespace: {ns}"),
        )
    }

    /// A value element whose content does not parse as its type.
    #[must_use]
    pub fn invalid_value(property: &str, err: &ValueError) -> Self {
        Self::new(
            XmlErrorKind::InvalidValue(err.kind),
            format!("{property}: {err}"),
        )
    }
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for XmlError {}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for XmlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::new(XmlErrorKind::Encoding, err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for XmlError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::new(XmlErrorKind::Encoding, err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for XmlError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::new(XmlErrorKind::Encoding, err.to_string())
    }
}

impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        Self::new(XmlErrorKind::Xml, err.to_string())
    }
}

/// XML error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlErrorKind {
    /// XML syntax or writer failure.
    Xml,
    MissingElement,
    UnexpectedElement,
    UnsupportedNamespace,
    /// Value content invalid for its element type (strict mode).
    InvalidValue(ValueErrorKind),
    /// Nesting deeper than the configured limit.
    DepthExceeded,
    Encoding,
}

impl fmt::Display for XmlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => write!(f, "XML error"),
            Self::MissingElement => write!(f, "missing element"),
            Self::UnexpectedElement => write!(f, "unexpected element"),
            Self::UnsupportedNamespace => write!(f, "unsupported namespace"),
            Self::InvalidValue(kind) => write!(f, "{kind}"),
            Self::DepthExceeded => write!(f, "nesting too deep"),
            Self::Encoding => write!(f, "encoding error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = XmlError::missing_element("vcalendar");
        assert_eq!(
            err.to_string(),
            "missing element: missing required element: vcalendar"
        );
        let err = XmlError::invalid_value(
            "DTSTART",
            &ValueError::new(ValueErrorKind::InvalidDateTime, "x"),
        );
        assert_eq!(err.kind, XmlErrorKind::InvalidValue(ValueErrorKind::InvalidDateTime));
    }
}
