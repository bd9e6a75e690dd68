//! Name to type registry for components and properties.
//!
//! Two static tables, one per document family, decide the default value
//! type of a property, whether it holds a comma-separated list and whether
//! it is a structured (semicolon-delimited) value. The text parser, the XML
//! parser and the programmatic constructors all resolve through here, so the
//! same property yields the same typed value whichever way it arrives.

use kasumi_core::DocumentKind;

use super::parameter::names;
use super::{Component, Property, Value, ValueType};
use crate::rfc::parse::values;

/// Creates a component for a name; unknown names become generic components.
#[must_use]
pub fn create_component(name: &str) -> Component {
    Component::named(name)
}

/// Creates a property, coercing plain text into the registry's type.
///
/// Text handed in for a typed property (`DTSTART`, `SEQUENCE`, `N`) is
/// parsed as that type; text that does not parse stays text. A value whose
/// type differs from the default gets a matching `VALUE` parameter.
#[must_use]
pub fn create_property(kind: DocumentKind, name: &str, value: Value) -> Property {
    let (group, name) = match name.split_once('.') {
        Some((group, name)) => (Some(group.to_string()), name),
        None => (None, name),
    };
    let default = default_value_type(kind, name);
    let value = coerce(kind, name, default, value);

    let mut property = Property::new(name, value);
    if let Some(group) = group {
        property = property.with_group(group);
    }

    let actual = property.value().value_type();
    if !is_text_like(property.value()) && canonical(actual) != canonical(default) {
        property.set_param(names::VALUE, actual.as_str());
    }
    property
}

/// Default value type for a property name (`TEXT` when unregistered).
#[must_use]
pub fn default_value_type(kind: DocumentKind, name: &str) -> ValueType {
    let name = name.to_ascii_uppercase();
    match kind {
        DocumentKind::Calendar => ical_default(&name),
        DocumentKind::Card => vcard_default(&name),
    }
}

/// Whether the property holds a comma-separated list of values.
#[must_use]
pub fn is_multi_value(kind: DocumentKind, name: &str) -> bool {
    let name = name.to_ascii_uppercase();
    match kind {
        DocumentKind::Calendar => matches!(
            name.as_str(),
            "CATEGORIES" | "RESOURCES" | "EXDATE" | "RDATE" | "FREEBUSY"
        ),
        DocumentKind::Card => matches!(name.as_str(), "NICKNAME" | "CATEGORIES"),
    }
}

/// Whether the property holds semicolon-separated fields.
#[must_use]
pub fn is_structured(kind: DocumentKind, name: &str) -> bool {
    let name = name.to_ascii_uppercase();
    match kind {
        DocumentKind::Calendar => matches!(name.as_str(), "REQUEST-STATUS" | "GEO"),
        DocumentKind::Card => matches!(name.as_str(), "N" | "ADR" | "ORG" | "GENDER"),
    }
}

fn ical_default(name: &str) -> ValueType {
    match name {
        "DTSTART" | "DTEND" | "DUE" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED"
        | "RECURRENCE-ID" | "EXDATE" | "RDATE" | "ACKNOWLEDGED" => ValueType::DateTime,
        "DURATION" | "TRIGGER" | "REFRESH-INTERVAL" => ValueType::Duration,
        "SEQUENCE" | "PRIORITY" | "PERCENT-COMPLETE" | "REPEAT" => ValueType::Integer,
        "RRULE" | "EXRULE" => ValueType::Recur,
        "TZOFFSETFROM" | "TZOFFSETTO" => ValueType::UtcOffset,
        "ATTENDEE" | "ORGANIZER" => ValueType::CalAddress,
        "URL" | "TZURL" | "ATTACH" | "SOURCE" | "CONFERENCE" | "IMAGE" => ValueType::Uri,
        "FREEBUSY" => ValueType::Period,
        _ => ValueType::Text,
    }
}

fn vcard_default(name: &str) -> ValueType {
    match name {
        "SOURCE" | "PHOTO" | "URL" | "LOGO" | "SOUND" | "FBURL" | "CALADRURI" | "CALURI"
        | "MEMBER" | "RELATED" | "IMPP" | "GEO" => ValueType::Uri,
        "REV" => ValueType::Timestamp,
        "BDAY" | "ANNIVERSARY" => ValueType::DateAndOrTime,
        "LANG" => ValueType::LanguageTag,
        _ => ValueType::Text,
    }
}

/// Collapses types that share one representation in [`Value`].
#[must_use]
pub const fn canonical(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Timestamp => ValueType::DateTime,
        ValueType::DateAndOrTime | ValueType::LanguageTag => ValueType::Text,
        other => other,
    }
}

/// Values that need no `VALUE` parameter in any slot.
pub(crate) fn is_text_like(value: &Value) -> bool {
    match value {
        Value::Text(_) | Value::Structured(_) | Value::Unknown(_) => true,
        Value::List(items) => items.iter().all(is_text_like),
        _ => false,
    }
}

fn coerce(kind: DocumentKind, name: &str, default: ValueType, value: Value) -> Value {
    let Value::Text(text) = value else {
        return value;
    };
    if is_structured(kind, name) {
        return values::parse_structured(&text);
    }
    if canonical(default) == ValueType::Text {
        return Value::Text(text);
    }
    let parsed = if is_multi_value(kind, name) {
        values::parse_list(default, &text)
    } else {
        values::parse_single(default, &text)
    };
    parsed.unwrap_or(Value::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{Date, DateTime};

    #[test]
    fn default_types() {
        let cal = DocumentKind::Calendar;
        assert_eq!(default_value_type(cal, "dtstart"), ValueType::DateTime);
        assert_eq!(default_value_type(cal, "SEQUENCE"), ValueType::Integer);
        assert_eq!(default_value_type(cal, "X-FOO"), ValueType::Text);
        assert_eq!(
            default_value_type(DocumentKind::Card, "REV"),
            ValueType::Timestamp
        );
        assert!(is_multi_value(cal, "categories"));
        assert!(!is_multi_value(cal, "SUMMARY"));
        assert!(is_structured(DocumentKind::Card, "ADR"));
    }

    #[test]
    fn text_like_values_need_no_type() {
        assert!(is_text_like(&Value::text("plain")));
        assert!(is_text_like(&Value::Unknown("raw;data".into())));
        assert!(is_text_like(&Value::List(vec![
            Value::text("a"),
            Value::text("b")
        ])));
        assert!(!is_text_like(&Value::Date(Date::new(2011, 12, 23))));
        assert!(!is_text_like(&Value::List(vec![
            Value::text("a"),
            Value::Date(Date::new(2011, 12, 23))
        ])));
    }

    #[test]
    fn text_is_coerced_to_registered_type() {
        let cal = DocumentKind::Calendar;
        let dtstart = create_property(cal, "DTSTART", Value::text("20111223T120000Z"));
        assert_eq!(
            dtstart.value(),
            &Value::DateTime(DateTime::utc(2011, 12, 23, 12, 0, 0))
        );
        assert!(dtstart.param("VALUE").is_none());

        let sequence = create_property(cal, "SEQUENCE", Value::text("not a number"));
        assert_eq!(sequence.as_text(), Some("not a number"));
    }

    #[test]
    fn non_default_type_gets_value_param() {
        let prop = create_property(
            DocumentKind::Calendar,
            "DTSTART",
            Value::Date(Date::new(2011, 12, 23)),
        );
        assert_eq!(prop.param_value("VALUE"), Some("DATE"));
    }

    #[test]
    fn grouped_structured_property() {
        let prop = create_property(DocumentKind::Card, "item1.N", Value::text("Doe;John;;;"));
        assert_eq!(prop.group(), Some("item1"));
        assert_eq!(prop.value().format(), "Doe;John;;;");
    }
}
