//! Parsing, tree mutation and serialization through the public API.

use kasumi_rfc::rfc::core::{Component, Date, DateTime, Value};
use kasumi_rfc::rfc::parse::{Diagnostic, ParseErrorKind, ParseOptions, parse_with};
use kasumi_rfc::rfc::{parse, serialize};

fn event(lines: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Example//EN\r\nBEGIN:VEVENT\r\n\
UID:e1\r\nDTSTAMP:20110101T000000Z\r\n{lines}END:VEVENT\r\nEND:VCALENDAR\r\n"
    )
}

#[test]
fn default_type_inference() {
    let root = parse(&event("DTSTART:20111223T120000Z\r\n")).unwrap();
    let dtstart = root.component("VEVENT").unwrap().property("DTSTART").unwrap();
    assert_eq!(
        dtstart.value(),
        &Value::DateTime(DateTime::utc(2011, 12, 23, 12, 0, 0))
    );

    let root = parse(&event("DTSTART;VALUE=DATE:20111223\r\n")).unwrap();
    let dtstart = root.component("VEVENT").unwrap().property("DTSTART").unwrap();
    assert_eq!(dtstart.value(), &Value::Date(Date::new(2011, 12, 23)));
}

#[test]
fn unclosed_component_is_an_error() {
    let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:x\r\n";
    let err = parse(input).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingEnd);
}

#[test]
fn set_replaces_and_add_accumulates() {
    let mut event = Component::event();
    event.set("SUMMARY", "A");
    event.set("SUMMARY", "B");
    assert_eq!(event.properties_named("SUMMARY").len(), 1);
    assert_eq!(event.text("SUMMARY"), Some("B"));

    event.add("ATTENDEE", Value::CalAddress("mailto:a@example.org".into()));
    event.add("ATTENDEE", Value::CalAddress("mailto:b@example.org".into()));
    let attendees: Vec<&str> = event
        .properties_named("ATTENDEE")
        .iter()
        .filter_map(|p| p.address())
        .collect();
    assert_eq!(attendees, ["mailto:a@example.org", "mailto:b@example.org"]);
}

#[test]
fn folded_output_unfolds_to_the_same_tree() {
    let mut calendar = Component::calendar("-//Example//EN");
    let mut event = Component::event();
    event.add("UID", "fold-1");
    event.add("DESCRIPTION", "\u{65e5}\u{672c}\u{8a9e} ".repeat(40));
    calendar.add_child(event);

    let text = serialize(&calendar);
    assert!(text.split_terminator("\r\n").all(|line| line.len() <= 75));
    assert_eq!(parse(&text).unwrap(), calendar);
}

#[test_log::test]
fn lenient_recoveries_are_reported() {
    let input = event("DTSTART;TZID=Nowhere/Special:20260105T090000\r\nSEQUENCE:often\r\n");
    let (root, diagnostics) = parse_with(&input, &ParseOptions::default()).unwrap();
    let event = root.component("VEVENT").unwrap();
    assert_eq!(
        event.property("DTSTART").unwrap().value(),
        &Value::DateTime(DateTime::floating(2026, 1, 5, 9, 0, 0))
    );
    assert_eq!(event.text("SEQUENCE"), Some("often"));
    assert!(diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::TimezoneUnresolved { tzid, .. } if tzid == "Nowhere/Special")));
    assert!(diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::ValueFallback { property, .. } if property == "SEQUENCE")));

    assert!(parse_with(&input, &ParseOptions::strict()).is_err());
}
