//! The two XML namespaces and their document element names.

use kasumi_core::DocumentKind;
use kasumi_core::constants::{XCAL_NS, XCARD_NS};

/// xCal (RFC 6321) or xCard (RFC 6351).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    XCal,
    XCard,
}

impl Namespace {
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            XCAL_NS => Some(Self::XCal),
            XCARD_NS => Some(Self::XCard),
            _ => None,
        }
    }

    #[must_use]
    pub const fn for_document(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Calendar => Self::XCal,
            DocumentKind::Card => Self::XCard,
        }
    }

    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::XCal => XCAL_NS,
            Self::XCard => XCARD_NS,
        }
    }

    #[must_use]
    pub const fn document(self) -> DocumentKind {
        match self {
            Self::XCal => DocumentKind::Calendar,
            Self::XCard => DocumentKind::Card,
        }
    }

    /// Outer element holding one or more documents.
    #[must_use]
    pub const fn container(self) -> &'static str {
        match self {
            Self::XCal => "icalendar",
            Self::XCard => "vcards",
        }
    }

    /// Element of a single document.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::XCal => "vcalendar",
            Self::XCard => "vcard",
        }
    }

    /// Whether date and time values use the ISO 8601 extended form
    /// (`2026-01-05T09:00:00Z`). xCard keeps the vCard basic form.
    #[must_use]
    pub const fn extended_dates(self) -> bool {
        matches!(self, Self::XCal)
    }
}
