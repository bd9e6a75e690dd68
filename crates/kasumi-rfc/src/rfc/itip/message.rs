//! Outgoing scheduling messages.

use super::method::Method;
use crate::rfc::build::serialize;
use crate::rfc::core::Component;

/// Status code stamped on every generated message: sent, delivery pending
/// (RFC 6638 §3.2.9). The delivery side overwrites it.
pub const PENDING_STATUS: &str = "1.1";

/// One iTIP message for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub uid: String,
    /// Name of the scheduled component (`VEVENT`, `VTODO`).
    pub component: String,
    pub method: Method,
    /// `SEQUENCE` shared by every message of one diff.
    pub sequence: i64,
    /// Calendar user address of the organizer.
    pub sender: String,
    /// Calendar user address of the attendee.
    pub recipient: String,
    pub schedule_status: String,
    /// Whether the recipient needs to act on the change.
    pub significant_change: bool,
    /// A `VCALENDAR` with `METHOD` set, holding every instance of the UID.
    pub payload: Component,
}

impl Message {
    /// The payload in the text encoding.
    #[must_use]
    pub fn to_ical(&self) -> String {
        serialize(&self.payload)
    }
}
