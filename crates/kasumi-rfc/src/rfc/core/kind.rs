//! Component kinds and the behavior each kind adds to the generic tree.

use kasumi_core::DocumentKind;

use super::time_range::{self, TimeRange};
use super::{Component, validate};
use crate::error::{StructureError, UsageError};
use crate::rfc::tz::DocumentResolver;

/// Component kind for iCalendar and vCard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR wrapper component.
    Calendar,
    /// VEVENT component.
    Event,
    /// VTODO component.
    Todo,
    /// VJOURNAL component.
    Journal,
    /// VFREEBUSY component.
    FreeBusy,
    /// VTIMEZONE component.
    Timezone,
    /// VALARM component (nested within VEVENT/VTODO).
    Alarm,
    /// STANDARD sub-component of VTIMEZONE.
    Standard,
    /// DAYLIGHT sub-component of VTIMEZONE.
    Daylight,
    /// VAVAILABILITY component (RFC 7953).
    Availability,
    /// AVAILABLE sub-component of VAVAILABILITY.
    Available,
    /// VCARD root.
    Card,
    /// Unknown/X-component.
    Unknown,
}

impl ComponentKind {
    /// Returns the string name for this component kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Availability => "VAVAILABILITY",
            Self::Available => "AVAILABLE",
            Self::Card => "VCARD",
            Self::Unknown => "X-UNKNOWN",
        }
    }

    /// Parses a component kind from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            "VAVAILABILITY" => Self::Availability,
            "AVAILABLE" => Self::Available,
            "VCARD" => Self::Card,
            _ => Self::Unknown,
        }
    }

    /// Document family whose property registry applies inside this kind.
    #[must_use]
    pub const fn document(self) -> DocumentKind {
        match self {
            Self::Card => DocumentKind::Card,
            _ => DocumentKind::Calendar,
        }
    }

    /// Returns whether this is a schedulable component (VEVENT, VTODO, VJOURNAL).
    #[must_use]
    pub const fn is_schedulable(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal)
    }

    /// Returns the behavior implementation for this kind.
    #[must_use]
    pub fn behavior(self) -> &'static dyn KindBehavior {
        match self {
            Self::Calendar => &CalendarKind,
            Self::Event => &EventKind,
            Self::Todo => &TodoKind,
            Self::Journal => &JournalKind,
            Self::Timezone => &TimezoneKind,
            Self::Standard | Self::Daylight => &ObservanceKind,
            Self::Alarm => &AlarmKind,
            Self::Card => &CardKind,
            Self::FreeBusy | Self::Availability | Self::Available | Self::Unknown => &GenericKind,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific operations layered over the generic component.
pub trait KindBehavior: Sync {
    /// Whether the component's effective occurrence intersects `range`.
    ///
    /// ## Errors
    /// Returns `UsageError::WrongKind` for kinds without time semantics.
    fn time_range(
        &self,
        component: &Component,
        _range: &TimeRange,
        _resolver: &DocumentResolver,
    ) -> Result<bool, UsageError> {
        Err(UsageError::WrongKind {
            operation: "time-range query",
            component: component.name().to_string(),
        })
    }

    /// Appends this component's own structure errors (children are walked separately).
    fn validate(&self, _component: &Component, _errors: &mut Vec<StructureError>) {}
}

struct GenericKind;
struct CalendarKind;
struct EventKind;
struct TodoKind;
struct JournalKind;
struct TimezoneKind;
struct ObservanceKind;
struct AlarmKind;
struct CardKind;

impl KindBehavior for GenericKind {}

impl KindBehavior for CalendarKind {
    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::calendar(component, errors);
    }
}

impl KindBehavior for EventKind {
    fn time_range(
        &self,
        component: &Component,
        range: &TimeRange,
        resolver: &DocumentResolver,
    ) -> Result<bool, UsageError> {
        Ok(time_range::event(component, range, resolver))
    }

    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::event(component, errors);
    }
}

impl KindBehavior for TodoKind {
    fn time_range(
        &self,
        component: &Component,
        range: &TimeRange,
        resolver: &DocumentResolver,
    ) -> Result<bool, UsageError> {
        Ok(time_range::todo(component, range, resolver))
    }

    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::todo(component, errors);
    }
}

impl KindBehavior for JournalKind {
    fn time_range(
        &self,
        component: &Component,
        range: &TimeRange,
        resolver: &DocumentResolver,
    ) -> Result<bool, UsageError> {
        Ok(time_range::journal(component, range, resolver))
    }

    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::journal(component, errors);
    }
}

impl KindBehavior for TimezoneKind {
    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::timezone(component, errors);
    }
}

impl KindBehavior for ObservanceKind {
    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::observance(component, errors);
    }
}

impl KindBehavior for AlarmKind {
    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::alarm(component, errors);
    }
}

impl KindBehavior for CardKind {
    fn validate(&self, component: &Component, errors: &mut Vec<StructureError>) {
        validate::card(component, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_kind_parse() {
        assert_eq!(ComponentKind::parse("VEVENT"), ComponentKind::Event);
        assert_eq!(ComponentKind::parse("vtodo"), ComponentKind::Todo);
        assert_eq!(ComponentKind::parse("vcard"), ComponentKind::Card);
        assert_eq!(ComponentKind::parse("X-CUSTOM"), ComponentKind::Unknown);
    }

    #[test]
    fn document_family() {
        assert_eq!(ComponentKind::Card.document(), DocumentKind::Card);
        assert_eq!(ComponentKind::Event.document(), DocumentKind::Calendar);
    }
}
