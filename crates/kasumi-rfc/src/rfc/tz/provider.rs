//! Provider interface and the rule shapes it hands back.

use chrono::{LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use super::VTimezone;
use crate::rfc::core::UtcOffset;

/// Source of timezone rules keyed by identifier.
///
/// Implementations are read-only after construction and shared freely.
pub trait TimezoneProvider: Send + Sync + std::fmt::Debug {
    /// Rules for an identifier, `None` when unknown.
    fn resolve(&self, id: &str) -> Option<TimezoneRules>;

    /// Every identifier this provider can resolve.
    fn list_known_identifiers(&self) -> Vec<String>;
}

/// Offset rules for one timezone.
#[derive(Debug, Clone, PartialEq)]
pub enum TimezoneRules {
    /// IANA database zone.
    Iana(Tz),
    /// Constant offset.
    Fixed(UtcOffset),
    /// Rules read from a VTIMEZONE in the document.
    Document(Box<VTimezone>),
}

impl TimezoneRules {
    /// UTC offset in effect at a wall-clock time.
    #[must_use]
    pub fn offset_at(&self, local: NaiveDateTime) -> UtcOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Iana(tz) => {
                let utc = self.to_utc(local);
                UtcOffset::from_seconds(
                    tz.offset_from_utc_datetime(&utc.naive_utc())
                        .fix()
                        .local_minus_utc(),
                )
            }
            Self::Document(vtz) => vtz.offset_at(local),
        }
    }

    /// Converts a wall-clock time to UTC.
    ///
    /// Ambiguous times (a fold) take the earlier instant; times inside a gap
    /// use the offset in effect before the gap, which moves them forward by
    /// the gap's length.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> chrono::DateTime<Utc> {
        match self {
            Self::Fixed(offset) => shift(local, *offset),
            Self::Iana(tz) => iana_to_utc(*tz, local),
            Self::Document(vtz) => vtz.to_utc(local),
        }
    }

    /// Converts a UTC instant to wall-clock time.
    #[must_use]
    pub fn from_utc(&self, utc: chrono::DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Fixed(offset) => utc.naive_utc() + TimeDelta::seconds(offset.as_seconds().into()),
            Self::Iana(tz) => utc.with_timezone(tz).naive_local(),
            Self::Document(vtz) => vtz.from_utc(utc),
        }
    }
}

/// `local - offset` as a UTC instant.
pub(super) fn shift(local: NaiveDateTime, offset: UtcOffset) -> chrono::DateTime<Utc> {
    let naive = local - TimeDelta::seconds(offset.as_seconds().into());
    Utc.from_utc_datetime(&naive)
}

fn iana_to_utc(tz: Tz, local: NaiveDateTime) -> chrono::DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let before = local - TimeDelta::hours(3);
            let offset = tz
                .from_local_datetime(&before)
                .earliest()
                .map_or(0, |dt| dt.offset().fix().local_minus_utc());
            tracing::trace!(%local, zone = tz.name(), "local time falls in a gap");
            shift(local, UtcOffset::from_seconds(offset))
        }
    }
}

/// Strips vendor prefixes some clients put in front of IANA names.
#[must_use]
pub fn normalize_tzid(tzid: &str) -> &str {
    let trimmed = tzid.trim();
    trimmed
        .strip_prefix("/mozilla.org/")
        .or_else(|| trimmed.strip_prefix("/softwarestudio.org/"))
        .or_else(|| {
            // `/citadel.org/20190914_1/Europe/Berlin` style paths.
            trimmed.strip_prefix('/').and_then(|rest| {
                let mut parts = rest.splitn(3, '/');
                parts.next()?;
                parts.next()?;
                parts.next()
            })
        })
        .unwrap_or(trimmed)
}

/// The IANA database compiled into `chrono-tz`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IanaProvider;

impl TimezoneProvider for IanaProvider {
    fn resolve(&self, id: &str) -> Option<TimezoneRules> {
        let normalized = normalize_tzid(id);
        if normalized.eq_ignore_ascii_case("Z") {
            return Some(TimezoneRules::Fixed(UtcOffset::UTC));
        }
        normalized.parse::<Tz>().ok().map(TimezoneRules::Iana)
    }

    fn list_known_identifiers(&self) -> Vec<String> {
        chrono_tz::TZ_VARIANTS
            .iter()
            .map(|tz| tz.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid local time")
    }

    #[test]
    fn resolves_iana_and_prefixed_names() {
        let provider = IanaProvider;
        assert_eq!(
            provider.resolve("America/New_York"),
            Some(TimezoneRules::Iana(Tz::America__New_York))
        );
        assert_eq!(
            provider.resolve("/mozilla.org/America/New_York"),
            Some(TimezoneRules::Iana(Tz::America__New_York))
        );
        assert!(provider.resolve("Mars/Olympus_Mons").is_none());
        assert!(
            provider
                .list_known_identifiers()
                .iter()
                .any(|id| id == "Europe/Berlin")
        );
    }

    #[test]
    fn winter_and_summer_offsets() {
        let rules = TimezoneRules::Iana(Tz::America__New_York);
        assert_eq!(
            rules.to_utc(local(2026, 1, 15, 10, 0)).naive_utc(),
            local(2026, 1, 15, 15, 0)
        );
        assert_eq!(
            rules.to_utc(local(2026, 7, 15, 10, 0)).naive_utc(),
            local(2026, 7, 15, 14, 0)
        );
        assert_eq!(rules.offset_at(local(2026, 7, 15, 10, 0)).hours(), -4);
    }

    #[test]
    fn gap_moves_forward_and_fold_takes_earlier() {
        let rules = TimezoneRules::Iana(Tz::America__New_York);
        // 2026-03-08 02:30 does not exist; read with EST it is 07:30 UTC.
        assert_eq!(
            rules.to_utc(local(2026, 3, 8, 2, 30)).naive_utc(),
            local(2026, 3, 8, 7, 30)
        );
        // 2026-11-01 01:30 happens twice; EDT comes first.
        assert_eq!(
            rules.to_utc(local(2026, 11, 1, 1, 30)).naive_utc(),
            local(2026, 11, 1, 5, 30)
        );
    }

    #[test]
    fn fixed_offset_round_trip() {
        let offset = UtcOffset::new(5, 30).expect("valid offset");
        let rules = TimezoneRules::Fixed(offset);
        let utc = rules.to_utc(local(2026, 1, 1, 12, 0));
        assert_eq!(utc.naive_utc(), local(2026, 1, 1, 6, 30));
        assert_eq!(rules.from_utc(utc), local(2026, 1, 1, 12, 0));
    }
}
