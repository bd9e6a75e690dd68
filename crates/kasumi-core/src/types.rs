use crate::constants::{XCAL_NS, XCARD_NS};
use crate::error::CoreError;

/// Document family a tree belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Calendar,
    Card,
}

impl DocumentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Card => "card",
        }
    }

    /// ## Summary
    /// Name of the root component for this family.
    #[must_use]
    pub const fn root_name(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Card => "VCARD",
        }
    }

    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Calendar => "text/calendar",
            Self::Card => "text/vcard",
        }
    }

    /// ## Summary
    /// Namespace of the XML encoding (xCal or xCard).
    #[must_use]
    pub const fn xml_namespace(self) -> &'static str {
        match self {
            Self::Calendar => XCAL_NS,
            Self::Card => XCARD_NS,
        }
    }

    /// ## Summary
    /// Resolves a root component name, case-insensitively.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` if the name is neither `VCALENDAR` nor `VCARD`.
    pub fn from_root_name(name: &str) -> Result<Self, CoreError> {
        if name.eq_ignore_ascii_case("VCALENDAR") {
            Ok(Self::Calendar)
        } else if name.eq_ignore_ascii_case("VCARD") {
            Ok(Self::Card)
        } else {
            Err(CoreError::InvalidInput(format!(
                "not a document root: {name}"
            )))
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_names() {
        assert_eq!(
            DocumentKind::from_root_name("vcalendar").ok(),
            Some(DocumentKind::Calendar)
        );
        assert_eq!(
            DocumentKind::from_root_name("VCARD").ok(),
            Some(DocumentKind::Card)
        );
        assert!(DocumentKind::from_root_name("VEVENT").is_err());
        assert_eq!(DocumentKind::Card.root_name(), "VCARD");
    }
}
