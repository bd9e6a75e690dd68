//! Value model and component tree shared by iCalendar and vCard.
//!
//! Documents of both families share one tree: a component holds properties
//! and sub-components in document order, and a property holds an optional
//! group, ordered parameters and one typed value. Kind-specific behavior
//! (time ranges, structural checks) hangs off [`ComponentKind`].

mod component;
mod datetime;
mod duration;
mod kind;
mod node;
mod parameter;
mod property;
pub mod registry;
mod rrule;
mod time_range;
mod validate;
mod value;

pub use component::Component;
pub use datetime::{Date, DateTime, DateTimeForm, Time, UtcOffset};
pub use duration::Duration;
pub use kind::{ComponentKind, KindBehavior};
pub use node::{Cursor, Node};
pub use parameter::{Parameter, names};
pub use property::{ContentLine, Property};
pub use rrule::{Frequency, RecurUntil, RecurrenceRule, Weekday, WeekdayNum};
pub use time_range::TimeRange;
pub use value::{Period, Value, ValueType};
