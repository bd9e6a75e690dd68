//! DATE, TIME, DATE-TIME and UTC-OFFSET values (RFC 5545 §3.3.4, §3.3.5, §3.3.12, §3.3.14).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// UTC offset representation (e.g., +0530, -0800, +013045).
///
/// Stored as total seconds from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    /// Total seconds from UTC (positive = east, negative = west).
    seconds: i32,
}

impl UtcOffset {
    /// UTC offset (zero).
    pub const UTC: Self = Self { seconds: 0 };

    /// Creates a UTC offset from hours and minutes.
    ///
    /// Returns `None` when the offset is outside ±24 hours.
    #[must_use]
    pub fn new(hours: i8, minutes: u8) -> Option<Self> {
        let sign = if hours < 0 { -1 } else { 1 };
        let seconds = i32::from(hours) * 3600 + sign * i32::from(minutes) * 60;
        (seconds.abs() < 24 * 3600 && minutes < 60).then_some(Self { seconds })
    }

    /// Creates a UTC offset from total seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Returns the offset as total seconds from UTC.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.seconds
    }

    /// Returns hours component (may be negative).
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Offsets are bounded to ±24 hours, truncation to i8 is safe"
    )]
    pub const fn hours(self) -> i8 {
        (self.seconds / 3600) as i8
    }

    /// Returns minutes component (always positive).
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Minutes component is always 0-59, truncation and sign loss to u8 are safe"
    )]
    pub const fn minutes(self) -> u8 {
        ((self.seconds.abs() % 3600) / 60) as u8
    }

    /// Converts to a chrono fixed offset.
    #[must_use]
    pub fn to_fixed(self) -> Option<chrono::FixedOffset> {
        chrono::FixedOffset::east_opt(self.seconds)
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let abs = self.seconds.abs();
        let hours = abs / 3600;
        let minutes = (abs % 3600) / 60;
        let seconds = abs % 60;
        write!(f, "{sign}{hours:02}{minutes:02}")?;
        if seconds != 0 {
            write!(f, "{seconds:02}")?;
        }
        Ok(())
    }
}

/// DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
}

impl Date {
    /// Creates a new date.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Converts to a chrono date, `None` if the calendar date does not exist.
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }

    /// Builds a date from a chrono date; years outside `u16` saturate.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "chrono months and days always fit in u8"
    )]
    pub fn from_naive(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: u16::try_from(date.year()).unwrap_or(u16::MAX),
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Time value (RFC 5545 §3.3.12).
///
/// Represents a time of day with optional UTC indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    /// Whether this time is in UTC (indicated by 'Z' suffix).
    pub is_utc: bool,
}

impl Time {
    /// Creates a new time value.
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8, is_utc: bool) -> Self {
        Self {
            hour,
            minute,
            second,
            is_utc,
        }
    }

    /// Creates a UTC time.
    #[must_use]
    pub const fn utc(hour: u8, minute: u8, second: u8) -> Self {
        Self::new(hour, minute, second, true)
    }

    /// Creates a local (non-UTC) time.
    #[must_use]
    pub const fn local(hour: u8, minute: u8, second: u8) -> Self {
        Self::new(hour, minute, second, false)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)?;
        if self.is_utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
///
/// iCalendar DATE-TIME values come in three mutually exclusive forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Floating time - same wall-clock time in any timezone.
    ///
    /// Example: `19980118T230000`
    Floating,

    /// UTC time - absolute instant, indicated by 'Z' suffix.
    ///
    /// Example: `19980119T070000Z`
    Utc,

    /// Zoned time - local time with a resolved TZID reference.
    ///
    /// Example: `TZID=America/New_York:19980119T020000`
    Zoned {
        /// The timezone identifier as written in the TZID parameter.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
///
/// A specific point in time, which may be floating, UTC, or zoned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    /// The form of this DATE-TIME (floating, UTC, or zoned).
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub fn floating(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            form: DateTimeForm::Utc,
            ..Self::floating(year, month, day, hour, minute, second)
        }
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    #[expect(
        clippy::too_many_arguments,
        reason = "Constructor mirrors RFC 5545 DATE-TIME components plus TZID"
    )]
    pub fn zoned(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        tzid: impl Into<String>,
    ) -> Self {
        Self {
            form: DateTimeForm::Zoned { tzid: tzid.into() },
            ..Self::floating(year, month, day, hour, minute, second)
        }
    }

    /// Builds a DATE-TIME from a chrono wall-clock time and a form.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "chrono calendar and clock fields always fit in u8"
    )]
    pub fn from_naive(naive: NaiveDateTime, form: DateTimeForm) -> Self {
        use chrono::Timelike;
        let date = Date::from_naive(naive.date());
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: naive.hour() as u8,
            minute: naive.minute() as u8,
            second: naive.second() as u8,
            form,
        }
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns whether this is a floating time.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }

    /// Returns the calendar date part.
    #[must_use]
    pub const fn date(&self) -> Date {
        Date::new(self.year, self.month, self.day)
    }

    /// Wall-clock time as chrono, ignoring the form. Leap seconds clamp to 59.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second.min(59)),
        )?;
        Some(self.date().to_naive()?.and_time(time))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_offset_display() {
        assert_eq!(UtcOffset::new(5, 30).map(|o| o.to_string()), Some("+0530".into()));
        assert_eq!(UtcOffset::new(-8, 0).map(|o| o.to_string()), Some("-0800".into()));
        assert_eq!(UtcOffset::UTC.to_string(), "+0000");
        assert_eq!(UtcOffset::from_seconds(-(3600 + 30 * 60 + 45)).to_string(), "-013045");
        assert_eq!(UtcOffset::new(25, 0), None);
    }

    #[test]
    fn negative_offset_minutes_follow_sign() {
        let offset = UtcOffset::new(-3, 30).expect("valid offset");
        assert_eq!(offset.as_seconds(), -(3 * 3600 + 30 * 60));
        assert_eq!(offset.hours(), -3);
        assert_eq!(offset.minutes(), 30);
    }

    #[test]
    fn time_display() {
        assert_eq!(Time::utc(13, 30, 0).to_string(), "133000Z");
        assert_eq!(Time::local(9, 15, 30).to_string(), "091530");
    }

    #[test]
    fn datetime_display_is_zero_padded() {
        let dt = DateTime::utc(2026, 1, 3, 2, 0, 0);
        assert_eq!(dt.to_string(), "20260103T020000Z");

        let dt = DateTime::zoned(2026, 1, 23, 12, 0, 0, "Europe/Berlin");
        assert_eq!(dt.to_string(), "20260123T120000");
        assert_eq!(dt.tzid(), Some("Europe/Berlin"));
    }

    #[test]
    fn naive_round_trip() {
        let dt = DateTime::floating(2024, 2, 29, 23, 59, 60);
        let naive = dt.to_naive().expect("valid date");
        assert_eq!(naive.to_string(), "2024-02-29 23:59:59");

        assert!(DateTime::floating(2023, 2, 29, 0, 0, 0).to_naive().is_none());
        let back = DateTime::from_naive(naive, DateTimeForm::Utc);
        assert_eq!(back, DateTime::utc(2024, 2, 29, 23, 59, 59));
    }
}
