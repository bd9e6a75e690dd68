//! Timezone resolution for zoned date-times.
//!
//! A [`TimezoneProvider`] answers `TZID` lookups from a process-wide table
//! (the IANA database via `chrono-tz` by default). A [`DocumentResolver`]
//! puts the VTIMEZONE definitions carried inside a document in front of a
//! provider and converts tree values to UTC instants.

mod provider;
mod resolver;
mod vtimezone;

pub use provider::{IanaProvider, TimezoneProvider, TimezoneRules, normalize_tzid};
pub use resolver::DocumentResolver;
pub use vtimezone::{Observance, ObservanceKind, VTimezone};
