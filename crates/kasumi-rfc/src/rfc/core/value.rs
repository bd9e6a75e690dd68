//! Typed property values (RFC 5545 §3.3, RFC 6350 §4).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{Date, DateTime, Duration, RecurrenceRule, Time, UtcOffset};
use crate::rfc::build::escape_text;

/// PERIOD value (RFC 5545 §3.3.9).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Period {
    /// Explicit start and end times.
    Explicit {
        start: DateTime,
        end: DateTime,
    },
    /// Start time and duration.
    Duration {
        start: DateTime,
        duration: Duration,
    },
}

impl Period {
    /// Creates an explicit period from start to end.
    #[must_use]
    pub fn explicit(start: DateTime, end: DateTime) -> Self {
        Self::Explicit { start, end }
    }

    /// Creates a period from a start time and duration.
    #[must_use]
    pub fn from_duration(start: DateTime, duration: Duration) -> Self {
        Self::Duration { start, duration }
    }

    /// Returns the start of the period.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}

/// Value data types named by the `VALUE` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Period,
    Recur,
    Text,
    Time,
    Uri,
    UtcOffset,
    /// vCard `DATE-AND-OR-TIME`, kept textually.
    DateAndOrTime,
    /// vCard `TIMESTAMP`, parsed like `DATE-TIME`.
    Timestamp,
    /// vCard `LANGUAGE-TAG`, kept textually.
    LanguageTag,
}

impl ValueType {
    /// Returns the RFC name used in the `VALUE` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::Boolean => "BOOLEAN",
            Self::CalAddress => "CAL-ADDRESS",
            Self::Date => "DATE",
            Self::DateTime => "DATE-TIME",
            Self::Duration => "DURATION",
            Self::Float => "FLOAT",
            Self::Integer => "INTEGER",
            Self::Period => "PERIOD",
            Self::Recur => "RECUR",
            Self::Text => "TEXT",
            Self::Time => "TIME",
            Self::Uri => "URI",
            Self::UtcOffset => "UTC-OFFSET",
            Self::DateAndOrTime => "DATE-AND-OR-TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::LanguageTag => "LANGUAGE-TAG",
        }
    }

    /// Parses a `VALUE` parameter (case-insensitive). `URL` is the vCard 3 spelling of `URI`.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "PERIOD" => Self::Period,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "TIME" => Self::Time,
            "URI" | "URL" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            "DATE-AND-OR-TIME" => Self::DateAndOrTime,
            "TIMESTAMP" => Self::Timestamp,
            "LANGUAGE-TAG" => Self::LanguageTag,
            _ => return None,
        })
    }

    /// Element name in the XML encodings (lowercase RFC name).
    #[must_use]
    pub fn xml_name(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed property value.
///
/// Every variant formats back to text deterministically (see [`Value::format`]).
/// Dates, times and durations re-render in canonical zero-padded form rather
/// than the exact characters read.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// TEXT value (unescaped).
    Text(String),
    /// INTEGER value.
    Integer(i64),
    /// FLOAT value.
    Float(f64),
    /// BOOLEAN value.
    Boolean(bool),
    /// BINARY value (decoded bytes, base64 on the wire).
    Binary(Vec<u8>),
    /// DATE value.
    Date(Date),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// TIME value.
    Time(Time),
    /// DURATION value.
    Duration(Duration),
    /// PERIOD value.
    Period(Period),
    /// RECUR value.
    Recur(Box<RecurrenceRule>),
    /// UTC-OFFSET value.
    UtcOffset(UtcOffset),
    /// CAL-ADDRESS value (typically a `mailto:` URI).
    CalAddress(String),
    /// URI value.
    Uri(String),
    /// Comma-separated values of one type (`CATEGORIES`, `EXDATE`, `FREEBUSY`).
    List(Vec<Value>),
    /// Semicolon-separated fields, each a comma-separated list of text
    /// components (`N`, `ADR`, `ORG`, `REQUEST-STATUS`, `GEO`).
    Structured(Vec<Vec<String>>),
    /// Value of an unrecognized `VALUE` type, written back verbatim.
    Unknown(String),
}

impl Value {
    /// Creates a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Creates a structured value with one component per field.
    #[must_use]
    pub fn structured<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Structured(fields.into_iter().map(|f| vec![f.into()]).collect())
    }

    /// Value type that best describes this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) | Self::Structured(_) | Self::Unknown(_) => ValueType::Text,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Binary(_) => ValueType::Binary,
            Self::Date(_) => ValueType::Date,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Time(_) => ValueType::Time,
            Self::Duration(_) => ValueType::Duration,
            Self::Period(_) => ValueType::Period,
            Self::Recur(_) => ValueType::Recur,
            Self::UtcOffset(_) => ValueType::UtcOffset,
            Self::CalAddress(_) => ValueType::CalAddress,
            Self::Uri(_) => ValueType::Uri,
            Self::List(items) => items.first().map_or(ValueType::Text, Self::value_type),
        }
    }

    /// Formats the value in its text-encoding form (escaped, unfolded).
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Self::Text(s) => escape_text(s),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::Binary(bytes) => STANDARD.encode(bytes),
            Self::Date(d) => d.to_string(),
            Self::DateTime(dt) => dt.to_string(),
            Self::Time(t) => t.to_string(),
            Self::Duration(d) => d.to_string(),
            Self::Period(p) => p.to_string(),
            Self::Recur(r) => r.to_string(),
            Self::UtcOffset(o) => o.to_string(),
            Self::CalAddress(s) | Self::Uri(s) | Self::Unknown(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::format)
                .collect::<Vec<_>>()
                .join(","),
            Self::Structured(fields) => fields
                .iter()
                .map(|components| {
                    components
                        .iter()
                        .map(|c| escape_text(c))
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .collect::<Vec<_>>()
                .join(";"),
        }
    }

    /// Iterates the individual values: list members, or the value itself.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        match self {
            Self::List(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }

    /// Returns this value as text, if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this value as a date-time, if it is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns this value as a date, if it is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a duration, if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a boolean, if it is a boolean value.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns this value as a recurrence rule, if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }

    /// Zone of the first zoned date-time held directly, in a list, or as a
    /// period start.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::DateTime(dt) => dt.tzid(),
            Self::Period(period) => period.start().tzid(),
            Self::List(items) => items.iter().find_map(Self::tzid),
            _ => None,
        }
    }

    /// Returns the address of a CAL-ADDRESS or URI value.
    #[must_use]
    pub fn as_address(&self) -> Option<&str> {
        match self {
            Self::CalAddress(s) | Self::Uri(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl From<RecurrenceRule> for Value {
    fn from(r: RecurrenceRule) -> Self {
        Self::Recur(Box::new(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_display() {
        assert_eq!(Date::new(2026, 1, 3).to_string(), "20260103");
    }

    #[test]
    fn period_display() {
        let start = DateTime::utc(2026, 1, 23, 9, 0, 0);
        let end = DateTime::utc(2026, 1, 23, 17, 0, 0);
        assert_eq!(
            Period::explicit(start.clone(), end).to_string(),
            "20260123T090000Z/20260123T170000Z"
        );
        assert_eq!(
            Period::from_duration(start, Duration::hours(8)).to_string(),
            "20260123T090000Z/PT8H"
        );
    }

    #[test]
    fn format_escapes_text_and_structured() {
        assert_eq!(Value::text("a, b; c\nd").format(), "a\\, b\\; c\\nd");
        let n = Value::Structured(vec![
            vec!["Doe".into()],
            vec!["Jane".into()],
            vec!["Ann".into(), "Marie".into()],
            vec![],
            vec!["Jr.".into()],
        ]);
        assert_eq!(n.format(), "Doe;Jane;Ann,Marie;;Jr.");
    }

    #[test]
    fn format_list_and_scalars() {
        let list = Value::List(vec![Value::text("WORK"), Value::text("a,b")]);
        assert_eq!(list.format(), "WORK,a\\,b");
        assert_eq!(Value::Boolean(true).format(), "TRUE");
        assert_eq!(Value::Binary(b"hello".to_vec()).format(), "aGVsbG8=");
        assert_eq!(Value::Unknown("raw;,\\".into()).format(), "raw;,\\");
    }

    #[test]
    fn value_type_of_list_uses_members() {
        let list = Value::List(vec![Value::Date(Date::new(2024, 1, 1))]);
        assert_eq!(list.value_type(), ValueType::Date);
        assert_eq!(list.iter().count(), 1);
        assert_eq!(Value::Integer(3).iter().count(), 1);
    }

    #[test]
    fn value_type_param_names() {
        assert_eq!(ValueType::from_param("date-time"), Some(ValueType::DateTime));
        assert_eq!(ValueType::from_param("URL"), Some(ValueType::Uri));
        assert_eq!(ValueType::from_param("X-CUSTOM"), None);
        assert_eq!(ValueType::UtcOffset.xml_name(), "utc-offset");
    }
}
