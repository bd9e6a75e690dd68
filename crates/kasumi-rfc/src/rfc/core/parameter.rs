//! Property parameters (RFC 5545 §3.2, RFC 6350 §5).

use std::fmt;

use crate::rfc::build::escape_param_value;

/// A single property parameter.
///
/// `DTSTART;TZID=America/New_York:20260123T120000` carries a parameter named
/// `TZID` with the value `America/New_York`. Names compare case-insensitively
/// and are stored uppercase; values keep their case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values. Most parameters have one value, but some
    /// (like MEMBER or TYPE) can have several comma-separated values.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a new parameter with multiple values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Returns whether this parameter has the given name (case-insensitive).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.values.is_empty() {
            let encoded: Vec<String> = self.values.iter().map(|v| escape_param_value(v)).collect();
            write!(f, "={}", encoded.join(","))?;
        }
        Ok(())
    }
}

/// Common parameter names.
pub mod names {
    pub const CHARSET: &str = "CHARSET";
    pub const CN: &str = "CN";
    pub const ENCODING: &str = "ENCODING";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const PARTSTAT: &str = "PARTSTAT";
    pub const ROLE: &str = "ROLE";
    pub const RSVP: &str = "RSVP";
    pub const SCHEDULE_AGENT: &str = "SCHEDULE-AGENT";
    pub const SCHEDULE_FORCE_SEND: &str = "SCHEDULE-FORCE-SEND";
    pub const SCHEDULE_STATUS: &str = "SCHEDULE-STATUS";
    pub const TYPE: &str = "TYPE";
    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";
}
