//! Offset rules read from VTIMEZONE components (RFC 5545 §3.6.5).

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use super::provider::shift;
use crate::error::StructureError;
use crate::rfc::core::{
    Component, ComponentKind, Frequency, RecurUntil, RecurrenceRule, UtcOffset, Value,
};

/// STANDARD or DAYLIGHT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservanceKind {
    Standard,
    Daylight,
}

/// One STANDARD/DAYLIGHT sub-component.
#[derive(Debug, Clone, PartialEq)]
pub struct Observance {
    pub kind: ObservanceKind,
    /// First onset, local time in `offset_from`.
    pub dtstart: NaiveDateTime,
    pub offset_from: UtcOffset,
    pub offset_to: UtcOffset,
    pub rule: Option<RecurrenceRule>,
    /// Extra onsets, local time in `offset_from`.
    pub rdates: Vec<NaiveDateTime>,
    /// TZNAME, if given.
    pub name: Option<String>,
}

impl Observance {
    fn from_component(component: &Component) -> Result<Self, StructureError> {
        let missing = |property: &'static str| StructureError::MissingProperty {
            component: component.name().to_string(),
            property,
        };
        let kind = match component.kind() {
            ComponentKind::Daylight => ObservanceKind::Daylight,
            _ => ObservanceKind::Standard,
        };
        let dtstart = component
            .property("DTSTART")
            .and_then(|p| local_of(p.value()))
            .ok_or_else(|| missing("DTSTART"))?;
        let offset = |name: &'static str| match component.property(name).map(|p| p.value()) {
            Some(Value::UtcOffset(offset)) => Ok(*offset),
            _ => Err(missing(name)),
        };
        let offset_from = offset("TZOFFSETFROM")?;
        let offset_to = offset("TZOFFSETTO")?;
        let rule = component
            .property("RRULE")
            .and_then(|p| p.value().as_recur())
            .cloned();
        let rdates = component
            .properties_named("RDATE")
            .into_iter()
            .flat_map(|p| p.value().iter())
            .filter_map(local_of)
            .collect();

        Ok(Self {
            kind,
            dtstart,
            offset_from,
            offset_to,
            rule,
            rdates,
            name: component.text("TZNAME").map(str::to_string),
        })
    }

    fn onset_utc(&self, local: NaiveDateTime) -> chrono::DateTime<Utc> {
        shift(local, self.offset_from)
    }

    /// Latest onset at or before `at`, as a UTC instant.
    fn last_onset(&self, at: chrono::DateTime<Utc>) -> Option<chrono::DateTime<Utc>> {
        let mut best: Option<chrono::DateTime<Utc>> = None;
        let mut consider = |local: NaiveDateTime| {
            let utc = self.onset_utc(local);
            if utc <= at && best.is_none_or(|b| utc > b) {
                best = Some(utc);
            }
        };

        consider(self.dtstart);
        for rdate in &self.rdates {
            consider(*rdate);
        }
        if let Some(rule) = &self.rule {
            for local in self.rule_onsets(rule, at) {
                consider(local);
            }
        }
        best
    }

    /// Rule onsets in the years around `at`.
    ///
    /// Yearly `BYMONTH` + `BYDAY` rules are computed directly; anything else
    /// goes through the `rrule` crate.
    fn rule_onsets(&self, rule: &RecurrenceRule, at: chrono::DateTime<Utc>) -> Vec<NaiveDateTime> {
        let simple_yearly = rule.freq == Some(Frequency::Yearly)
            && rule.interval.is_none_or(|i| i == 1)
            && rule.by_month.len() == 1
            && rule.by_day.len() == 1
            && rule.by_monthday.is_empty()
            && rule.by_setpos.is_empty();

        if !simple_yearly {
            return self.expanded_onsets(rule, at);
        }

        let year = at.year();
        let first_year = self.dtstart.year();
        let until = rule.until.as_ref().and_then(until_utc);
        (year - 1..=year)
            .filter(|&y| y >= first_year)
            .filter(|&y| {
                rule.count
                    .is_none_or(|count| u32::try_from(y - first_year).is_ok_and(|n| n < count))
            })
            .filter_map(|y| {
                let day = nth_weekday(y, u32::from(rule.by_month[0]), rule.by_day[0])?;
                Some(day.and_time(self.dtstart.time()))
            })
            .filter(|local| until.is_none_or(|u| self.onset_utc(*local) <= u))
            .collect()
    }

    fn expanded_onsets(&self, rule: &RecurrenceRule, at: chrono::DateTime<Utc>) -> Vec<NaiveDateTime> {
        match rule.to_rrule_set(self.dtstart) {
            Ok(set) => {
                let limit = at.with_timezone(&rrule::Tz::UTC) + TimeDelta::days(1);
                set.before(limit)
                    .all(u16::MAX)
                    .dates
                    .into_iter()
                    .map(|d| d.naive_utc())
                    .collect()
            }
            Err(err) => {
                tracing::warn!(error = %err, "observance RRULE not expandable");
                Vec::new()
            }
        }
    }
}

/// Wall-clock time of a DATE or DATE-TIME value.
fn local_of(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => dt.to_naive(),
        Value::Date(d) => d.to_naive()?.and_hms_opt(0, 0, 0),
        Value::Period(p) => p.start().to_naive(),
        _ => None,
    }
}

fn until_utc(until: &RecurUntil) -> Option<chrono::DateTime<Utc>> {
    let naive = match until {
        RecurUntil::Date(d) => d.to_naive()?.and_hms_opt(23, 59, 59)?,
        RecurUntil::DateTime(dt) => dt.to_naive()?,
    };
    Some(naive.and_utc())
}

/// Day of the nth (or nth-from-last) weekday in a month.
fn nth_weekday(year: i32, month: u32, day: crate::rfc::core::WeekdayNum) -> Option<NaiveDate> {
    let weekday = day.weekday.to_chrono();
    let ordinal = day.ordinal.unwrap_or(1);
    match u8::try_from(ordinal) {
        Ok(n) if n > 0 => NaiveDate::from_weekday_of_month_opt(year, month, weekday, n),
        _ => {
            let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
            let back = (last.weekday().num_days_from_monday() + 7
                - weekday.num_days_from_monday())
                % 7;
            let weeks_back = i64::from(ordinal.unsigned_abs().saturating_sub(1));
            let date = last - TimeDelta::days(i64::from(back)) - TimeDelta::weeks(weeks_back);
            (date.month() == month).then_some(date)
        }
    }
}

/// A timezone defined inside a document.
#[derive(Debug, Clone, PartialEq)]
pub struct VTimezone {
    pub tzid: String,
    pub observances: Vec<Observance>,
}

impl VTimezone {
    /// Reads a VTIMEZONE component.
    ///
    /// ## Errors
    /// Returns a `StructureError` when `TZID`, every observance, or an
    /// observance's `DTSTART`/`TZOFFSETFROM`/`TZOFFSETTO` is missing.
    pub fn from_component(component: &Component) -> Result<Self, StructureError> {
        let tzid = component
            .text("TZID")
            .ok_or_else(|| StructureError::MissingProperty {
                component: component.name().to_string(),
                property: "TZID",
            })?
            .to_string();
        let observances = component
            .components()
            .filter(|c| matches!(c.kind(), ComponentKind::Standard | ComponentKind::Daylight))
            .map(Observance::from_component)
            .collect::<Result<Vec<_>, _>>()?;
        if observances.is_empty() {
            return Err(StructureError::MissingComponent {
                component: component.name().to_string(),
                child: "STANDARD or DAYLIGHT",
            });
        }
        Ok(Self { tzid, observances })
    }

    /// Offset in effect at a UTC instant.
    #[must_use]
    pub fn offset_at_utc(&self, at: chrono::DateTime<Utc>) -> UtcOffset {
        self.observances
            .iter()
            .filter_map(|o| o.last_onset(at).map(|onset| (onset, o.offset_to)))
            .max_by_key(|(onset, _)| *onset)
            .map_or_else(
                || {
                    // Before every onset: the earliest observance's prior offset.
                    self.observances
                        .iter()
                        .min_by_key(|o| o.dtstart)
                        .map_or(UtcOffset::UTC, |o| o.offset_from)
                },
                |(_, offset)| offset,
            )
    }

    /// Offset in effect at a wall-clock time.
    #[must_use]
    pub fn offset_at(&self, local: NaiveDateTime) -> UtcOffset {
        self.offset_at_utc(self.to_utc(local))
    }

    /// Wall-clock time to UTC. Folds take the earlier instant; gaps use the
    /// offset in effect before the transition.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> chrono::DateTime<Utc> {
        let mut candidates: Vec<UtcOffset> = self
            .observances
            .iter()
            .flat_map(|o| [o.offset_from, o.offset_to])
            .collect();
        candidates.sort_by_key(|o| std::cmp::Reverse(o.as_seconds()));
        candidates.dedup();

        // Larger offsets give earlier instants, so the first consistent one wins.
        if let Some(utc) = candidates
            .iter()
            .map(|offset| (shift(local, *offset), *offset))
            .find(|(utc, offset)| self.offset_at_utc(*utc) == *offset)
            .map(|(utc, _)| utc)
        {
            return utc;
        }

        let before = self.offset_at_utc(shift(local, UtcOffset::UTC) - TimeDelta::days(1));
        shift(local, before)
    }

    /// UTC instant to wall-clock time.
    #[must_use]
    pub fn from_utc(&self, utc: chrono::DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc() + TimeDelta::seconds(self.offset_at_utc(utc).as_seconds().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{DateTime, Weekday, WeekdayNum};

    fn observance(kind: ComponentKind, start: DateTime, from: UtcOffset, to: UtcOffset, rule: RecurrenceRule) -> Component {
        let mut c = Component::new(kind);
        c.add("DTSTART", start);
        c.add("TZOFFSETFROM", Value::UtcOffset(from));
        c.add("TZOFFSETTO", Value::UtcOffset(to));
        c.add("RRULE", rule);
        c
    }

    /// US Eastern since 2007.
    fn eastern() -> VTimezone {
        let est = UtcOffset::from_seconds(-5 * 3600);
        let edt = UtcOffset::from_seconds(-4 * 3600);
        let mut tz = Component::timezone();
        tz.add("TZID", "Custom/Eastern");
        tz.add_child(observance(
            ComponentKind::Daylight,
            DateTime::floating(2007, 3, 11, 2, 0, 0),
            est,
            edt,
            RecurrenceRule::new(Frequency::Yearly)
                .with_by_month(vec![3])
                .with_by_day(WeekdayNum::nth(2, Weekday::Sunday).into_iter().collect()),
        ));
        tz.add_child(observance(
            ComponentKind::Standard,
            DateTime::floating(2007, 11, 4, 2, 0, 0),
            edt,
            est,
            RecurrenceRule::new(Frequency::Yearly)
                .with_by_month(vec![11])
                .with_by_day(WeekdayNum::nth(1, Weekday::Sunday).into_iter().collect()),
        ));
        VTimezone::from_component(&tz).expect("valid VTIMEZONE")
    }

    fn local(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .expect("valid local time")
    }

    #[test]
    fn follows_yearly_transitions() {
        let tz = eastern();
        assert_eq!(tz.offset_at(local(2026, 1, 15, 10)).hours(), -5);
        assert_eq!(tz.offset_at(local(2026, 7, 15, 10)).hours(), -4);
        assert_eq!(tz.to_utc(local(2026, 7, 15, 10)).naive_utc(), local(2026, 7, 15, 14));
        assert_eq!(tz.from_utc(local(2026, 1, 15, 15).and_utc()), local(2026, 1, 15, 10));
    }

    #[test]
    fn last_weekday_of_month() {
        let last_sunday = WeekdayNum::nth(-1, Weekday::Sunday).expect("valid");
        assert_eq!(
            nth_weekday(2026, 3, last_sunday),
            NaiveDate::from_ymd_opt(2026, 3, 29)
        );
        assert_eq!(
            nth_weekday(2026, 10, last_sunday),
            NaiveDate::from_ymd_opt(2026, 10, 25)
        );
    }

    #[test]
    fn missing_offsets_are_structure_errors() {
        let mut tz = Component::timezone();
        tz.add("TZID", "Broken");
        let mut standard = Component::new(ComponentKind::Standard);
        standard.add("DTSTART", DateTime::floating(2000, 1, 1, 0, 0, 0));
        tz.add_child(standard);
        assert!(matches!(
            VTimezone::from_component(&tz),
            Err(StructureError::MissingProperty { property: "TZOFFSETFROM", .. })
        ));
    }
}
