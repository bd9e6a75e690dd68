//! Time-range queries on parsed documents.

use chrono::{TimeZone, Utc};
use kasumi_rfc::UsageError;
use kasumi_rfc::rfc::core::{Cursor, TimeRange};
use kasumi_rfc::rfc::parse;
use kasumi_rfc::rfc::parse::ParseOptions;

fn range(from: (i32, u32, u32), to: (i32, u32, u32)) -> TimeRange {
    TimeRange::new(
        Utc.with_ymd_and_hms(from.0, from.1, from.2, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(to.0, to.1, to.2, 0, 0, 0).unwrap(),
    )
}

fn hours(day: (i32, u32, u32), from: u32, to: u32) -> TimeRange {
    TimeRange::new(
        Utc.with_ymd_and_hms(day.0, day.1, day.2, from, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(day.0, day.1, day.2, to, 0, 0).unwrap(),
    )
}

fn calendar(body: &str) -> kasumi_rfc::rfc::Component {
    parse(&format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Example//EN\r\n{body}END:VCALENDAR\r\n"
    ))
    .unwrap()
}

#[test]
fn todo_with_only_due() {
    let root = calendar("BEGIN:VTODO\r\nUID:t\r\nDUE:20111225\r\nEND:VTODO\r\n");
    let todo = root.component("VTODO").unwrap();
    assert!(todo.is_in_time_range(&range((2011, 1, 1), (2012, 1, 1))).unwrap());
    assert!(!todo.is_in_time_range(&range((2011, 1, 1), (2011, 11, 1))).unwrap());
}

#[test]
fn todo_without_dates_matches_everything() {
    let root = calendar("BEGIN:VTODO\r\nUID:t\r\nSUMMARY:Someday\r\nEND:VTODO\r\n");
    let todo = root.component("VTODO").unwrap();
    assert!(todo.is_in_time_range(&range((1990, 1, 1), (1990, 1, 2))).unwrap());
    assert!(todo.is_in_time_range(&range((2030, 6, 1), (2030, 7, 1))).unwrap());
}

#[test_log::test]
fn recurring_event_matches_later_occurrences() {
    let root = calendar(
        "BEGIN:VEVENT\r\nUID:e\r\nDTSTART:20260105T090000Z\r\nDURATION:PT1H\r\n\
RRULE:FREQ=WEEKLY;COUNT=10\r\nEXDATE:20260119T090000Z\r\nEND:VEVENT\r\n",
    );
    let event = root.component("VEVENT").unwrap();
    assert!(event.is_in_time_range(&range((2026, 2, 2), (2026, 2, 3))).unwrap());
    assert!(!event.is_in_time_range(&range((2026, 1, 19), (2026, 1, 20))).unwrap());
    assert!(!event.is_in_time_range(&range((2027, 1, 1), (2027, 2, 1))).unwrap());
}

#[test]
fn wrong_kind_is_a_usage_error() {
    let root = calendar("BEGIN:VEVENT\r\nUID:e\r\nDTSTART:20260105T090000Z\r\nEND:VEVENT\r\n");
    assert!(matches!(
        root.is_in_time_range(&range((2026, 1, 1), (2026, 2, 1))),
        Err(UsageError::WrongKind { .. })
    ));
}

#[test_log::test]
fn floating_times_follow_the_configured_zone() {
    let root = calendar(
        "BEGIN:VEVENT\r\nUID:f\r\nDTSTART:20260105T090000\r\nDURATION:PT1H\r\nEND:VEVENT\r\n",
    );
    let event = root.component("VEVENT").unwrap();
    // 09:00 in Tokyo is 00:00 UTC.
    let early = hours((2026, 1, 5), 0, 2);
    assert!(!event.is_in_time_range(&early).unwrap());

    let options = ParseOptions {
        default_timezone: "Asia/Tokyo".into(),
        ..ParseOptions::default()
    };
    let resolver = options.resolver_for(&root);
    assert!(event.is_in_time_range_with(&early, &resolver).unwrap());
    assert!(!event.is_in_time_range_with(&hours((2026, 1, 5), 9, 10), &resolver).unwrap());
}

#[test_log::test]
fn document_timezones_drive_the_query() {
    let root = calendar(
        "BEGIN:VTIMEZONE\r\nTZID:Custom/Plus5\r\nBEGIN:STANDARD\r\nDTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0500\r\nTZOFFSETTO:+0500\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\n\
BEGIN:VEVENT\r\nUID:z\r\nDTSTART;TZID=Custom/Plus5:20260105T090000\r\nDURATION:PT1H\r\nEND:VEVENT\r\n",
    );
    let event = root.component("VEVENT").unwrap();
    // 09:00 at +05:00 is 04:00 UTC.
    let window = hours((2026, 1, 5), 4, 5);

    // Without the document the zone is unknown and read as UTC.
    assert!(!event.is_in_time_range(&window).unwrap());

    let resolver = ParseOptions::default().resolver_for(&root);
    assert!(event.is_in_time_range_with(&window, &resolver).unwrap());

    let cursor = Cursor::root_of(&root).child_named("VEVENT").unwrap();
    assert!(cursor.is_in_time_range(&window).unwrap());
    assert!(!cursor.is_in_time_range(&hours((2026, 1, 5), 9, 10)).unwrap());
    assert!(matches!(
        cursor.child_named("UID").unwrap().is_in_time_range(&window),
        Err(UsageError::WrongKind { .. })
    ));
}
