//! Value elements (RFC 6321 §3.6, RFC 6351 §4).
//!
//! Every value becomes one element named after its type (`<date-time>`,
//! `<text>`, `<recur>`); lists repeat the element and structured values use
//! one element per field. xCal writes dates and times in the ISO 8601
//! extended form, xCard keeps the basic form of the text encoding.

use kasumi_core::DocumentKind;

use super::element::Element;
use super::namespace::Namespace;
use crate::error::{ValueError, ValueErrorKind};
use crate::rfc::core::{Period, RecurrenceRule, Value, ValueType, registry};
use crate::rfc::parse::values;

/// Field element names of the structured properties that have them.
fn field_names(kind: DocumentKind, name: &str) -> Option<&'static [&'static str]> {
    match (kind, name.to_ascii_uppercase().as_str()) {
        (DocumentKind::Calendar, "REQUEST-STATUS") => Some(&["code", "description", "data"]),
        (DocumentKind::Calendar, "GEO") => Some(&["latitude", "longitude"]),
        (DocumentKind::Card, "N") => Some(&["surname", "given", "additional", "prefix", "suffix"]),
        (DocumentKind::Card, "ADR") => Some(&[
            "pobox", "ext", "street", "locality", "region", "code", "country",
        ]),
        (DocumentKind::Card, "GENDER") => Some(&["sex", "identity"]),
        _ => None,
    }
}

fn is_dated(ty: ValueType) -> bool {
    matches!(
        ty,
        ValueType::Date
            | ValueType::DateTime
            | ValueType::Time
            | ValueType::UtcOffset
            | ValueType::Timestamp
    )
}

/// `20260105T090000Z` to `2026-01-05T09:00:00Z`, `+0130` to `+01:30`.
///
/// Text that is not in the expected basic shape is returned unchanged.
pub(super) fn extend(ty: ValueType, basic: &str) -> String {
    if !basic.is_ascii() {
        return basic.to_string();
    }
    match ty {
        ValueType::Date => extend_date(basic),
        ValueType::Time => extend_time(basic),
        ValueType::DateTime | ValueType::Timestamp => match basic.split_once('T') {
            Some((date, time)) => format!("{}T{}", extend_date(date), extend_time(time)),
            None => extend_date(basic),
        },
        ValueType::UtcOffset if basic.len() > 1 => {
            let (sign, rest) = basic.split_at(1);
            format!("{sign}{}", colons(rest))
        }
        _ => basic.to_string(),
    }
}

fn extend_date(date: &str) -> String {
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

fn extend_time(time: &str) -> String {
    let (clock, zone) = time
        .strip_suffix('Z')
        .map_or((time, ""), |clock| (clock, "Z"));
    format!("{}{zone}", colons(clock))
}

/// Inserts `:` between digit pairs.
fn colons(digits: &str) -> String {
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }
    digits
        .as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .collect::<Vec<_>>()
        .join(":")
}

/// The basic form of an extended date, time or offset.
pub(super) fn basic(ty: ValueType, extended: &str) -> String {
    let trimmed = extended.trim();
    match ty {
        ValueType::Date | ValueType::DateTime | ValueType::Timestamp => {
            trimmed.replace(['-', ':'], "")
        }
        ValueType::Time | ValueType::UtcOffset => trimmed.replace(':', ""),
        _ => trimmed.to_string(),
    }
}

/// Element name for a value of type `actual` in a slot whose default is
/// `default`. The vCard-only aliases (`timestamp`, `language-tag`) survive
/// when the value has the shape they describe.
fn element_type(default: ValueType, actual: ValueType) -> ValueType {
    if registry::canonical(default) == actual {
        default
    } else {
        actual
    }
}

/// Element name for text in a DATE-AND-OR-TIME slot (`BDAY`, `ANNIVERSARY`).
fn classify_text(text: &str) -> &'static str {
    if text.starts_with('T') {
        "time"
    } else if text.contains('T') {
        "date-time"
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        "date"
    } else {
        "text"
    }
}

/// Builds the value elements of one property.
pub(super) fn value_elements(
    kind: DocumentKind,
    name: &str,
    value: &Value,
    ns: Namespace,
) -> Vec<Element> {
    let default = registry::default_value_type(kind, name);
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| item_element(default, item, ns))
            .collect(),
        Value::Structured(fields) => structured_elements(kind, name, fields),
        other => vec![item_element(default, other, ns)],
    }
}

fn structured_elements(kind: DocumentKind, name: &str, fields: &[Vec<String>]) -> Vec<Element> {
    match field_names(kind, name) {
        Some(names) => fields
            .iter()
            .zip(names.iter())
            .flat_map(|(components, field)| {
                components
                    .iter()
                    .map(move |component| Element::with_text(*field, component.as_str()))
            })
            .collect(),
        None => fields
            .iter()
            .map(|components| Element::with_text("text", components.join(",")))
            .collect(),
    }
}

fn item_element(default: ValueType, value: &Value, ns: Namespace) -> Element {
    let dated = |ty: ValueType, text: String| {
        let ty = element_type(default, ty);
        let text = if ns.extended_dates() {
            extend(ty, &text)
        } else {
            text
        };
        Element::with_text(ty.xml_name(), text)
    };

    match value {
        Value::Text(text) => match default {
            ValueType::DateAndOrTime => Element::with_text(classify_text(text), text.as_str()),
            ValueType::LanguageTag => Element::with_text("language-tag", text.as_str()),
            _ => Element::with_text("text", text.as_str()),
        },
        Value::Unknown(text) => Element::with_text("unknown", text.as_str()),
        Value::Boolean(b) => Element::with_text("boolean", if *b { "true" } else { "false" }),
        Value::Date(_) | Value::DateTime(_) | Value::Time(_) | Value::UtcOffset(_) => {
            dated(value.value_type(), value.format())
        }
        Value::Period(period) => period_element(period, ns),
        Value::Recur(rule) => recur_element(rule, ns),
        Value::Structured(fields) => Element::with_text("text", value_text(fields)),
        Value::List(items) => Element::with_text(
            "text",
            items.iter().map(Value::format).collect::<Vec<_>>().join(","),
        ),
        other => Element::with_text(other.value_type().xml_name(), other.format()),
    }
}

fn value_text(fields: &[Vec<String>]) -> String {
    fields
        .iter()
        .map(|components| components.join(","))
        .collect::<Vec<_>>()
        .join(";")
}

fn period_element(period: &Period, ns: Namespace) -> Element {
    let date_time = |text: String| {
        if ns.extended_dates() {
            extend(ValueType::DateTime, &text)
        } else {
            text
        }
    };
    let mut element = Element::new("period");
    match period {
        Period::Explicit { start, end } => {
            element.push(Element::with_text("start", date_time(start.to_string())));
            element.push(Element::with_text("end", date_time(end.to_string())));
        }
        Period::Duration { start, duration } => {
            element.push(Element::with_text("start", date_time(start.to_string())));
            element.push(Element::with_text("duration", duration.to_string()));
        }
    }
    element
}

fn recur_element(rule: &RecurrenceRule, ns: Namespace) -> Element {
    let mut element = Element::new("recur");
    for (part, part_values) in rule.parts() {
        let tag = part.to_ascii_lowercase();
        for value in part_values {
            let value = if part == "UNTIL" && ns.extended_dates() {
                extend(ValueType::DateTime, &value)
            } else {
                value
            };
            element.push(Element::with_text(tag.as_str(), value));
        }
    }
    element
}

/// Reads the value elements of one property back into a [`Value`].
///
/// ## Errors
/// Returns the `ValueError` of the first element whose content does not
/// parse as the type its name declares.
pub(super) fn parse_value(
    kind: DocumentKind,
    name: &str,
    elements: &[&Element],
    ns: Namespace,
) -> Result<Value, ValueError> {
    if registry::is_structured(kind, name)
        && let Some(value) = parse_structured(kind, name, elements)
    {
        return Ok(value);
    }

    let default = registry::default_value_type(kind, name);
    let mut items = elements
        .iter()
        .map(|element| parse_item(default, element, ns))
        .collect::<Result<Vec<_>, _>>()?;

    if items.len() == 1 && !registry::is_multi_value(kind, name) {
        return Ok(items.remove(0));
    }
    if items.is_empty() {
        return Ok(Value::Text(String::new()));
    }
    Ok(Value::List(items))
}

/// Structured fields, up to the last field element present. Without field
/// names each `<text>` is one field (`ORG`). `None` when neither exists.
fn parse_structured(kind: DocumentKind, name: &str, elements: &[&Element]) -> Option<Value> {
    if let Some(names) = field_names(kind, name) {
        let last = names
            .iter()
            .rposition(|field| elements.iter().any(|e| e.name == *field))?;
        let fields = names[..=last]
            .iter()
            .map(|field| {
                let components: Vec<String> = elements
                    .iter()
                    .filter(|e| e.name == *field)
                    .map(|e| e.text.clone())
                    .collect();
                if components.is_empty() {
                    vec![String::new()]
                } else {
                    components
                }
            })
            .collect();
        return Some(Value::Structured(fields));
    }

    let texts: Vec<&Element> = elements.iter().copied().filter(|e| e.name == "text").collect();
    if texts.is_empty() {
        return None;
    }
    Some(Value::Structured(
        texts.iter().map(|e| vec![e.text.clone()]).collect(),
    ))
}

fn parse_item(default: ValueType, element: &Element, ns: Namespace) -> Result<Value, ValueError> {
    let text = element.text.as_str();
    if default == ValueType::DateAndOrTime
        && matches!(element.name.as_str(), "date" | "date-time" | "time" | "text")
    {
        let kept = if ns.extended_dates() && element.name != "text" {
            basic(ValueType::DateTime, text)
        } else {
            text.to_string()
        };
        return Ok(Value::Text(kept));
    }

    match element.name.as_str() {
        "text" | "language-tag" => Ok(Value::Text(text.to_string())),
        "unknown" => Ok(Value::Unknown(text.to_string())),
        "uri" => Ok(Value::Uri(text.trim().to_string())),
        "cal-address" => Ok(Value::CalAddress(text.trim().to_string())),
        "binary" => values::parse_binary(text.trim(), false).map(Value::Binary),
        "period" => parse_period(element),
        "recur" => parse_recur(element),
        other => match ValueType::from_param(other) {
            Some(ty) if is_dated(ty) => values::parse_single(ty, &basic(ty, text)),
            Some(ty) => values::parse_single(ty, text.trim()),
            None => Ok(Value::Unknown(text.to_string())),
        },
    }
}

fn parse_period(element: &Element) -> Result<Value, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidPeriod, element.text.as_str());
    let start = element.child("start").ok_or_else(err)?;
    let tail = match (element.child("end"), element.child("duration")) {
        (Some(end), _) => basic(ValueType::DateTime, &end.text),
        (None, Some(duration)) => duration.text.trim().to_string(),
        (None, None) => return Err(err()),
    };
    let raw = format!("{}/{tail}", basic(ValueType::DateTime, &start.text));
    values::parse_period(&raw).map(Value::Period)
}

fn parse_recur(element: &Element) -> Result<Value, ValueError> {
    let mut parts: Vec<(String, Vec<String>)> = Vec::new();
    for child in &element.children {
        let name = child.name.to_ascii_uppercase();
        let value = if name == "UNTIL" {
            basic(ValueType::DateTime, &child.text)
        } else {
            child.text.trim().to_string()
        };
        match parts.iter_mut().find(|(part, _)| *part == name) {
            Some((_, existing)) => existing.push(value),
            None => parts.push((name, vec![value])),
        }
    }
    let raw = parts
        .iter()
        .map(|(name, items)| format!("{name}={}", items.join(",")))
        .collect::<Vec<_>>()
        .join(";");
    values::parse_recur(&raw).map(|rule| Value::Recur(Box::new(rule)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{Date, DateTime, Duration, Frequency};

    #[test]
    fn extended_forms() {
        assert_eq!(extend(ValueType::Date, "20260105"), "2026-01-05");
        assert_eq!(
            extend(ValueType::DateTime, "20260105T090000Z"),
            "2026-01-05T09:00:00Z"
        );
        assert_eq!(extend(ValueType::Time, "090000"), "09:00:00");
        assert_eq!(extend(ValueType::UtcOffset, "-0500"), "-05:00");
        assert_eq!(extend(ValueType::UtcOffset, "+013015"), "+01:30:15");
        assert_eq!(basic(ValueType::DateTime, " 2026-01-05T09:00:00 "), "20260105T090000");
        assert_eq!(basic(ValueType::UtcOffset, "-05:00"), "-0500");
    }

    #[test]
    fn birthday_text_is_classified() {
        let els = value_elements(
            DocumentKind::Card,
            "BDAY",
            &Value::text("19850412"),
            Namespace::XCard,
        );
        assert_eq!(els[0].name, "date");
        assert_eq!(classify_text("T1022"), "time");
        assert_eq!(classify_text("19850412T1022"), "date-time");
        assert_eq!(classify_text("circa 1800"), "text");

        let refs: Vec<&Element> = els.iter().collect();
        let back = parse_value(DocumentKind::Card, "BDAY", &refs, Namespace::XCard).unwrap();
        assert_eq!(back, Value::text("19850412"));
    }

    #[test]
    fn structured_fields_stop_at_last_present() {
        let value = Value::Structured(vec![
            vec!["Doe".into()],
            vec!["John".into(), "J.".into()],
            vec![String::new()],
            vec!["Dr".into()],
        ]);
        let els = value_elements(DocumentKind::Card, "N", &value, Namespace::XCard);
        let names: Vec<&str> = els.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["surname", "given", "given", "additional", "prefix"]);

        let refs: Vec<&Element> = els.iter().collect();
        let back = parse_value(DocumentKind::Card, "N", &refs, Namespace::XCard).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn period_and_recur_elements() {
        let period = Period::from_duration(DateTime::utc(2026, 1, 5, 9, 0, 0), Duration::hours(2));
        let el = period_element(&period, Namespace::XCal);
        assert_eq!(el.child("start").unwrap().text, "2026-01-05T09:00:00Z");
        assert_eq!(el.child("duration").unwrap().text, "PT2H");
        assert_eq!(parse_period(&el).unwrap(), Value::Period(period));

        let rule = values::parse_recur("FREQ=WEEKLY;UNTIL=20260301T000000Z;BYDAY=MO,WE").unwrap();
        let el = recur_element(&rule, Namespace::XCal);
        let byday: Vec<&str> = el.children_named("byday").map(|e| e.text.as_str()).collect();
        assert_eq!(byday, ["MO", "WE"]);
        assert_eq!(el.child("until").unwrap().text, "2026-03-01T00:00:00Z");
        let Value::Recur(back) = parse_recur(&el).unwrap() else {
            panic!("expected recur");
        };
        assert_eq!(back.freq, Some(Frequency::Weekly));
        assert_eq!(*back, rule);
    }

    #[test]
    fn typed_items_and_lists() {
        let el = Element::with_text("date", "2026-02-01");
        let value = parse_value(DocumentKind::Calendar, "EXDATE", &[&el], Namespace::XCal).unwrap();
        assert_eq!(value, Value::List(vec![Value::Date(Date::new(2026, 2, 1))]));

        let bad = Element::with_text("integer", "many");
        let err = parse_value(DocumentKind::Calendar, "SEQUENCE", &[&bad], Namespace::XCal)
            .unwrap_err();
        assert_eq!(err.kind, ValueErrorKind::InvalidInteger);

        let odd = Element::with_text("x-shape", "blob");
        let value = parse_value(DocumentKind::Calendar, "X-THING", &[&odd], Namespace::XCal).unwrap();
        assert_eq!(value, Value::Unknown("blob".into()));
    }
}
