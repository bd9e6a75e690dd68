//! Non-fatal findings collected during a lenient parse.

use std::fmt;

use crate::error::ValueError;

/// Something the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A `TZID` nobody defines; the time was kept floating.
    TimezoneUnresolved { line: usize, tzid: String },
    /// A value that did not parse as its type and was kept as text.
    ValueFallback {
        line: usize,
        property: String,
        error: ValueError,
    },
    /// Bytes decoded lossily because the `CHARSET` is unsupported or the
    /// bytes were invalid in it.
    Charset { line: usize, charset: String },
    /// Lines after the root component were ignored.
    TrailingContent { line: usize },
    /// A physical line longer than the configured limit.
    LineTooLong { line: usize, octets: usize },
}

impl Diagnostic {
    /// Line the finding refers to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::TimezoneUnresolved { line, .. }
            | Self::ValueFallback { line, .. }
            | Self::Charset { line, .. }
            | Self::TrailingContent { line }
            | Self::LineTooLong { line, .. } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimezoneUnresolved { line, tzid } => {
                write!(f, "line {line}: unresolved TZID {tzid:?}, kept as floating time")
            }
            Self::ValueFallback {
                line,
                property,
                error,
            } => write!(f, "line {line}: {property} kept as text ({error})"),
            Self::Charset { line, charset } => {
                write!(f, "line {line}: lossy decode of CHARSET={charset}")
            }
            Self::TrailingContent { line } => {
                write!(f, "line {line}: ignored content after end of document")
            }
            Self::LineTooLong { line, octets } => {
                write!(f, "line {line}: {octets} octets without folding")
            }
        }
    }
}
