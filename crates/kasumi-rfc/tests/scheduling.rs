//! Organizer-side scheduling, end to end.

use kasumi_rfc::rfc::itip::{Broker, Method};
use kasumi_rfc::rfc::parse;

const TODO_NO_ATTENDEES: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//EN\r\n\
BEGIN:VTODO\r\n\
UID:todo-1\r\n\
SUMMARY:Buy milk\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

const TODO_ONE_ATTENDEE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//EN\r\n\
BEGIN:VTODO\r\n\
UID:todo-2\r\n\
SUMMARY:Review draft\r\n\
ORGANIZER:mailto:one@example.org\r\n\
ATTENDEE:mailto:two@example.org\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

fn todo(input: &str) -> kasumi_rfc::rfc::Component {
    parse(input)
        .unwrap()
        .component("VTODO")
        .cloned()
        .unwrap()
}

#[test_log::test]
fn no_attendees_means_no_messages() {
    let new = todo(TODO_NO_ATTENDEES);
    assert!(Broker::default().diff(None, Some(&new)).is_empty());
}

#[test_log::test]
fn single_attendee_gets_one_request() {
    let new = todo(TODO_ONE_ATTENDEE);
    let messages = Broker::default().diff(None, Some(&new));
    assert_eq!(messages.len(), 1);

    let message = &messages[0];
    assert_eq!(message.method, Method::Request);
    assert_eq!(message.sequence, 1);
    assert_eq!(message.sender, "mailto:one@example.org");
    assert_eq!(message.recipient, "mailto:two@example.org");
    assert!(message.significant_change);
    assert_eq!(message.uid, "todo-2");
    assert_eq!(message.component, "VTODO");

    let payload = parse(&message.to_ical()).unwrap();
    assert_eq!(payload.text("METHOD"), Some("REQUEST"));
    let sent = payload.component("VTODO").unwrap();
    assert_eq!(sent.property("SEQUENCE").unwrap().value().as_integer(), Some(1));
}

#[test_log::test]
fn whole_calendars_diff_like_bare_components() {
    let old = parse(TODO_ONE_ATTENDEE).unwrap();
    let new = parse(&TODO_ONE_ATTENDEE.replace("Review draft", "Review final")).unwrap();
    let messages = Broker::default().diff(Some(&old), Some(&new));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sequence, 1);
    assert!(messages[0].significant_change);
}

#[test]
fn deleting_cancels() {
    let old = todo(TODO_ONE_ATTENDEE);
    let messages = Broker::default().diff(Some(&old), None);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].method, Method::Cancel);
    assert!(messages[0].to_ical().contains("METHOD:CANCEL\r\n"));
}
