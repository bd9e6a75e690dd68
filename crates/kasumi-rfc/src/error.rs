use std::fmt;

use thiserror::Error;

use crate::rfc::parse::ParseError;
use crate::rfc::xml::XmlError;

/// Library-level errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    ValueError(#[from] ValueError),

    #[error(transparent)]
    StructureError(#[from] StructureError),

    #[error(transparent)]
    UsageError(#[from] UsageError),

    #[error(transparent)]
    XmlError(#[from] XmlError),

    #[error(transparent)]
    CoreError(#[from] kasumi_core::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

/// A value that is lexically well-formed but invalid for its declared type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {value:?}")]
pub struct ValueError {
    pub kind: ValueErrorKind,
    /// The offending raw text.
    pub value: String,
}

impl ValueError {
    #[must_use]
    pub fn new(kind: ValueErrorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Categories of value errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    InvalidDate,
    InvalidTime,
    InvalidDateTime,
    InvalidDuration,
    InvalidPeriod,
    InvalidUtcOffset,
    InvalidBoolean,
    InvalidInteger,
    InvalidFloat,
    InvalidBinary,
    InvalidRecur,
    InvalidFrequency,
    InvalidWeekday,
    /// Both `COUNT` and `UNTIL` in one rule.
    UntilCountConflict,
    /// A recurrence rule part outside its numeric range.
    OutOfRange,
    /// A `TZID` that no provider knows (strict mode only).
    UnresolvedTimezone,
    /// Decoded bytes are not valid in the declared `CHARSET`.
    InvalidCharset,
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidDate => "invalid DATE value",
            Self::InvalidTime => "invalid TIME value",
            Self::InvalidDateTime => "invalid DATE-TIME value",
            Self::InvalidDuration => "invalid DURATION value",
            Self::InvalidPeriod => "invalid PERIOD value",
            Self::InvalidUtcOffset => "invalid UTC-OFFSET value",
            Self::InvalidBoolean => "invalid BOOLEAN value",
            Self::InvalidInteger => "invalid INTEGER value",
            Self::InvalidFloat => "invalid FLOAT value",
            Self::InvalidBinary => "invalid BINARY value",
            Self::InvalidRecur => "invalid RECUR value",
            Self::InvalidFrequency => "invalid FREQ value",
            Self::InvalidWeekday => "invalid weekday",
            Self::UntilCountConflict => "UNTIL and COUNT are mutually exclusive",
            Self::OutOfRange => "rule part out of range",
            Self::UnresolvedTimezone => "unknown timezone",
            Self::InvalidCharset => "undecodable charset",
        };
        f.write_str(msg)
    }
}

/// Structural problems in a component tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("{component} is missing required property {property}")]
    MissingProperty {
        component: String,
        property: &'static str,
    },

    #[error("{component} must not contain both {first} and {second}")]
    MutuallyExclusive {
        component: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("{component} requires at least one {child}")]
    MissingComponent {
        component: String,
        child: &'static str,
    },

    #[error("{0} is not a document root")]
    InvalidRoot(String),
}

/// Misuse of the tree API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("node is not a child of {parent}")]
    NotAChild { parent: String },

    #[error("child index {index} out of range for {parent} with {len} children")]
    IndexOutOfRange {
        parent: String,
        index: usize,
        len: usize,
    },

    #[error("{operation} is not supported on {component}")]
    WrongKind {
        operation: &'static str,
        component: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::new(ValueErrorKind::InvalidInteger, "abc");
        assert_eq!(err.to_string(), "invalid INTEGER value: \"abc\"");
    }

    #[test]
    fn rfc_error_wraps_usage() {
        let err: RfcError = UsageError::WrongKind {
            operation: "time-range query",
            component: "VCARD".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "time-range query is not supported on VCARD"
        );
    }
}
