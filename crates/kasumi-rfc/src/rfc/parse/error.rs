//! Positioned parse errors for the text encodings.

use std::fmt;

use crate::error::{StructureError, ValueError, ValueErrorKind};

pub type ParseResult<T> = Result<T, ParseError>;

/// A fatal error with the position it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Logical line (1-based).
    pub line: usize,
    /// Column (1-based) within the logical line.
    pub column: usize,
    /// Human-readable detail.
    pub context: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: String::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Promotes a value error found at a position.
    #[must_use]
    pub fn from_value(err: &ValueError, line: usize, column: usize) -> Self {
        Self::new(ParseErrorKind::Value(err.kind), line, column)
            .with_context(format!("{:?}", err.value))
    }

    /// Wraps a structure error found by strict validation.
    #[must_use]
    pub fn from_structure(err: &StructureError, line: usize) -> Self {
        Self::new(ParseErrorKind::Structure, line, 1).with_context(err.to_string())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.kind, self.line, self.column
        )?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nothing but whitespace.
    EmptyInput,
    /// The first line is not `BEGIN:`.
    MissingBegin,
    /// Input ended inside a component.
    MissingEnd,
    /// `END` name differs from the open `BEGIN`.
    MismatchedComponent,
    /// Root is neither VCALENDAR nor VCARD.
    InvalidRoot,
    /// Lines after the root's `END` (strict mode).
    TrailingContent,
    MissingPropertyName,
    InvalidPropertyName,
    InvalidParameter,
    UnclosedQuote,
    MissingColon,
    /// Unfolded physical line over the octet limit (strict mode).
    LineTooLong,
    /// Components nested past the configured limit.
    DepthExceeded,
    /// A value error promoted in strict mode.
    Value(ValueErrorKind),
    /// A validation failure in strict mode.
    Structure,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("empty input"),
            Self::MissingBegin => f.write_str("expected BEGIN"),
            Self::MissingEnd => f.write_str("missing END"),
            Self::MismatchedComponent => f.write_str("mismatched END"),
            Self::InvalidRoot => f.write_str("invalid root component"),
            Self::TrailingContent => f.write_str("content after end of document"),
            Self::MissingPropertyName => f.write_str("missing property name"),
            Self::InvalidPropertyName => f.write_str("invalid property name"),
            Self::InvalidParameter => f.write_str("invalid parameter"),
            Self::UnclosedQuote => f.write_str("unclosed quote"),
            Self::MissingColon => f.write_str("missing ':'"),
            Self::LineTooLong => f.write_str("line too long"),
            Self::DepthExceeded => f.write_str("nesting too deep"),
            Self::Value(kind) => write!(f, "{kind}"),
            Self::Structure => f.write_str("invalid structure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new(ParseErrorKind::MissingEnd, 7, 1).with_context("END:VEVENT");
        assert_eq!(err.to_string(), "missing END at line 7, column 1: END:VEVENT");
    }

    #[test]
    fn value_errors_keep_their_kind() {
        let value = ValueError::new(ValueErrorKind::InvalidInteger, "abc");
        let err = ParseError::from_value(&value, 3, 10);
        assert_eq!(err.kind, ParseErrorKind::Value(ValueErrorKind::InvalidInteger));
        assert_eq!(err.column, 10);
    }
}
