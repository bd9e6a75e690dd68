//! iCalendar (RFC 5545) and vCard (RFC 6350) documents: parsing, a mutable
//! component tree, serialization, the xCal/xCard XML encodings, timezone
//! resolution and iTIP scheduling messages.
//!
//! ```rust
//! use kasumi_rfc::rfc::core::Component;
//! use kasumi_rfc::rfc::{build, parse};
//!
//! let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//EN\r\nEND:VCALENDAR\r\n";
//! let mut calendar = parse::parse(input).expect("valid calendar");
//!
//! let mut event = Component::event();
//! event.add("UID", "my-event-1");
//! event.set("SUMMARY", "Team Meeting");
//! calendar.add_child(event);
//!
//! let output = build::serialize(&calendar);
//! assert!(output.contains("SUMMARY:Team Meeting\r\n"));
//! ```

pub mod error;
pub mod rfc;

pub use error::{RfcError, RfcResult, StructureError, UsageError, ValueError, ValueErrorKind};
