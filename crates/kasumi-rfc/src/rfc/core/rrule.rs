//! RECUR value type (RFC 5545 §3.3.10).

use std::fmt;

use chrono::{NaiveDateTime, TimeZone};

use super::{Date, DateTime};
use crate::error::{ValueError, ValueErrorKind};

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Maps to chrono's weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekday with optional occurrence number, as used in `BYDAY`.
///
/// `MO` is every Monday, `1MO` the first Monday of the period, `-1FR` the last
/// Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// Returns `None` if the ordinal is 0 or outside -53..=53.
    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Option<Self> {
        (ordinal != 0 && (-53..=53).contains(&ordinal)).then_some(Self {
            ordinal: Some(ordinal),
            weekday,
        })
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// UNTIL boundary, either DATE or DATE-TIME.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecurUntil {
    /// Date-only boundary (inclusive).
    Date(Date),
    /// Date-time boundary (inclusive).
    DateTime(DateTime),
}

impl fmt::Display for RecurUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10).
///
/// Rule parts render in a fixed order: `FREQ`, `UNTIL`/`COUNT`, `INTERVAL`,
/// the `BY*` lists from smallest to largest unit, `BYSETPOS`, `WKST`, then any
/// unrecognized parts in their original order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RecurrenceRule {
    /// Recurrence frequency (required).
    pub freq: Option<Frequency>,
    /// Recurrence interval, kept as written (absent means 1).
    pub interval: Option<u32>,
    /// End date/time of the recurrence (mutually exclusive with count).
    pub until: Option<RecurUntil>,
    /// Number of occurrences (mutually exclusive with until).
    pub count: Option<u32>,
    /// Week start day (default: Monday).
    pub wkst: Option<Weekday>,
    pub by_second: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_hour: Vec<u8>,
    pub by_day: Vec<WeekdayNum>,
    pub by_monthday: Vec<i8>,
    pub by_yearday: Vec<i16>,
    pub by_weekno: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_setpos: Vec<i16>,
    /// Parts this model does not interpret (`RSCALE`, `SKIP`, `X-...`).
    pub extensions: Vec<(String, String)>,
}

impl RecurrenceRule {
    /// Creates a rule with the given frequency.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the count, clearing any until boundary.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None;
        self
    }

    /// Sets the until boundary, clearing any count.
    #[must_use]
    pub fn with_until(mut self, until: RecurUntil) -> Self {
        self.until = Some(until);
        self.count = None;
        self
    }

    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    /// Rule parts as (name, values) pairs in rendering order.
    ///
    /// Shared by the text form (`NAME=v1,v2` joined with `;`) and the XML
    /// form (one element per value).
    #[must_use]
    pub fn parts(&self) -> Vec<(String, Vec<String>)> {
        fn list<T: ToString>(out: &mut Vec<(String, Vec<String>)>, name: &str, items: &[T]) {
            if !items.is_empty() {
                out.push((name.to_string(), items.iter().map(ToString::to_string).collect()));
            }
        }

        let mut out = Vec::new();
        if let Some(freq) = self.freq {
            out.push(("FREQ".to_string(), vec![freq.to_string()]));
        }
        if let Some(ref until) = self.until {
            out.push(("UNTIL".to_string(), vec![until.to_string()]));
        }
        if let Some(count) = self.count {
            out.push(("COUNT".to_string(), vec![count.to_string()]));
        }
        if let Some(interval) = self.interval {
            out.push(("INTERVAL".to_string(), vec![interval.to_string()]));
        }
        list(&mut out, "BYSECOND", &self.by_second);
        list(&mut out, "BYMINUTE", &self.by_minute);
        list(&mut out, "BYHOUR", &self.by_hour);
        list(&mut out, "BYDAY", &self.by_day);
        list(&mut out, "BYMONTHDAY", &self.by_monthday);
        list(&mut out, "BYYEARDAY", &self.by_yearday);
        list(&mut out, "BYWEEKNO", &self.by_weekno);
        list(&mut out, "BYMONTH", &self.by_month);
        list(&mut out, "BYSETPOS", &self.by_setpos);
        if let Some(wkst) = self.wkst {
            out.push(("WKST".to_string(), vec![wkst.to_string()]));
        }
        for (name, value) in &self.extensions {
            out.push((name.clone(), vec![value.clone()]));
        }
        out
    }

    /// Builds an `rrule` set anchored at a wall-clock `DTSTART`.
    ///
    /// Expansion runs in the wall-clock domain: the start and any `UNTIL` are
    /// treated as UTC digits, and callers map each occurrence back through
    /// the owning timezone. Extension parts are not forwarded.
    ///
    /// ## Errors
    /// Returns `ValueErrorKind::InvalidRecur` when the `rrule` crate rejects
    /// the rule.
    pub fn to_rrule_set(&self, dtstart: NaiveDateTime) -> Result<rrule::RRuleSet, ValueError> {
        let text: Vec<String> = self
            .parts()
            .into_iter()
            .filter(|(name, _)| {
                !self.extensions.iter().any(|(ext, _)| ext == name)
            })
            .map(|(name, values)| match (name.as_str(), &self.until) {
                ("UNTIL", Some(RecurUntil::Date(d))) => format!("UNTIL={d}T235959Z"),
                ("UNTIL", Some(RecurUntil::DateTime(dt))) => {
                    let digits = dt.to_string();
                    format!("UNTIL={}Z", digits.trim_end_matches('Z'))
                }
                _ => format!("{name}={}", values.join(",")),
            })
            .collect();
        let text = text.join(";");

        let invalid = |err: rrule::RRuleError| {
            ValueError::new(ValueErrorKind::InvalidRecur, format!("{text}: {err}"))
        };
        let rule = text
            .parse::<rrule::RRule<rrule::Unvalidated>>()
            .map_err(invalid)?;
        let start = rrule::Tz::UTC.from_utc_datetime(&dtstart);
        rule.build(start).map_err(invalid)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts()
            .into_iter()
            .map(|(name, values)| format!("{name}={}", values.join(",")))
            .collect();
        f.write_str(&rendered.join(";"))
    }
}
