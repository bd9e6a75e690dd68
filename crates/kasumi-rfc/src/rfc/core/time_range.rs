//! Time-range intersection for VEVENT, VTODO and VJOURNAL (RFC 4791 §9.9).

use chrono::{NaiveDateTime, TimeDelta, TimeZone, Utc};

use super::{Component, DateTimeForm, Period, Value};
use crate::rfc::tz::DocumentResolver;

type Instant = chrono::DateTime<Utc>;

/// A UTC window; `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Instant,
    pub end: Instant,
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    /// Window with no lower bound.
    #[must_use]
    pub const fn ending_at(end: Instant) -> Self {
        Self::new(chrono::DateTime::<Utc>::MIN_UTC, end)
    }

    /// Window with no upper bound.
    #[must_use]
    pub const fn starting_at(start: Instant) -> Self {
        Self::new(start, chrono::DateTime::<Utc>::MAX_UTC)
    }

    /// Overlap test for an occurrence `[start, start + duration)`.
    ///
    /// Zero-length occurrences match when they fall inside the window.
    fn overlaps(&self, start: Instant, duration: TimeDelta) -> bool {
        if duration > TimeDelta::zero() {
            let end = add(start, duration);
            self.start < end && self.end > start
        } else {
            self.start <= start && self.end > start
        }
    }
}

fn add(instant: Instant, delta: TimeDelta) -> Instant {
    instant
        .checked_add_signed(delta)
        .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC)
}

/// Slack added around the window when expanding in wall-clock time, wide
/// enough to cover any UTC offset.
const EXPANSION_SLACK_HOURS: i64 = 26;

/// VEVENT rule: DTSTART plus DTEND, DURATION, or the one-day/instant
/// default; recurring events expand RRULE and RDATE minus EXDATE.
pub(super) fn event(component: &Component, range: &TimeRange, resolver: &DocumentResolver) -> bool {
    let Some(dtstart) = component.property("DTSTART") else {
        return false;
    };
    let Some(start) = resolver.value_to_utc(dtstart.value()) else {
        return false;
    };
    let is_date = matches!(dtstart.value(), Value::Date(_));

    let duration = if let Some(end) = component
        .property("DTEND")
        .and_then(|p| resolver.value_to_utc(p.value()))
    {
        end - start
    } else if let Some(duration) = component
        .property("DURATION")
        .and_then(|p| p.value().as_duration())
    {
        duration.to_chrono()
    } else if is_date {
        TimeDelta::days(1)
    } else {
        TimeDelta::zero()
    };

    let recurring = component.property("RRULE").is_some() || component.property("RDATE").is_some();
    if !recurring {
        return range.overlaps(start, duration);
    }

    occurrences(component, range, resolver, duration)
        .into_iter()
        .any(|(start, duration)| range.overlaps(start, duration))
}

/// Expands the recurrence set of a component into UTC `(start, duration)`
/// pairs that can touch the window.
fn occurrences(
    component: &Component,
    range: &TimeRange,
    resolver: &DocumentResolver,
    duration: TimeDelta,
) -> Vec<(Instant, TimeDelta)> {
    let Some(dtstart) = component.property("DTSTART") else {
        return Vec::new();
    };
    let (naive_start, form) = match dtstart.value() {
        Value::DateTime(dt) => match dt.to_naive() {
            Some(naive) => (naive, dt.form.clone()),
            None => return Vec::new(),
        },
        Value::Date(d) => match d.to_naive().and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(naive) => (naive, DateTimeForm::Floating),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let excluded = exclusions(component, resolver);
    let is_excluded = |naive: NaiveDateTime, utc: Instant| {
        excluded.iter().any(|ex| match ex {
            Exclusion::Day(day) => naive.date() == *day,
            Exclusion::Instant(at) => *at == utc,
        })
    };

    let mut found = Vec::new();
    let recurrence = component
        .property("RRULE")
        .and_then(|p| p.value().as_recur());
    match recurrence.map(|rule| rule.to_rrule_set(naive_start)) {
        Some(Ok(set)) => {
            let slack = TimeDelta::hours(EXPANSION_SLACK_HOURS);
            let lower = range
                .start
                .naive_utc()
                .checked_sub_signed(duration.max(TimeDelta::zero()) + slack);
            let upper = range.end.naive_utc().checked_add_signed(slack);
            let mut set = set;
            if let Some(lower) = lower {
                set = set.after(rrule::Tz::UTC.from_utc_datetime(&lower));
            }
            if let Some(upper) = upper {
                set = set.before(rrule::Tz::UTC.from_utc_datetime(&upper));
            }
            for occurrence in set.all(u16::MAX).dates {
                let naive = occurrence.naive_utc();
                let utc = resolver.local_to_utc(naive, &form);
                if !is_excluded(naive, utc) {
                    found.push((utc, duration));
                }
            }
        }
        Some(Err(err)) => {
            tracing::warn!(error = %err, uid = ?component.uid(), "RRULE not expandable; using first instance");
            let utc = resolver.local_to_utc(naive_start, &form);
            found.push((utc, duration));
        }
        None => {
            let utc = resolver.local_to_utc(naive_start, &form);
            if !is_excluded(naive_start, utc) {
                found.push((utc, duration));
            }
        }
    }

    for rdate in component.properties_named("RDATE") {
        for item in rdate.value().iter() {
            let pair = match item {
                Value::Period(Period::Explicit { start, end }) => resolver
                    .to_utc(start)
                    .zip(resolver.to_utc(end))
                    .map(|(s, e)| (s, e - s)),
                Value::Period(Period::Duration { start, duration }) => {
                    resolver.to_utc(start).map(|s| (s, duration.to_chrono()))
                }
                other => resolver.value_to_utc(other).map(|s| (s, duration)),
            };
            if let Some(pair) = pair {
                found.push(pair);
            }
        }
    }
    found
}

enum Exclusion {
    Day(chrono::NaiveDate),
    Instant(Instant),
}

fn exclusions(component: &Component, resolver: &DocumentResolver) -> Vec<Exclusion> {
    component
        .properties_named("EXDATE")
        .into_iter()
        .flat_map(|p| p.value().iter())
        .filter_map(|v| match v {
            Value::Date(d) => d.to_naive().map(Exclusion::Day),
            Value::DateTime(dt) => resolver.to_utc(dt).map(Exclusion::Instant),
            _ => None,
        })
        .collect()
}

/// VTODO rule, following the RFC 4791 §9.9 table row for the properties present.
pub(super) fn todo(component: &Component, range: &TimeRange, resolver: &DocumentResolver) -> bool {
    let instant = |name: &str| {
        component
            .property(name)
            .and_then(|p| resolver.value_to_utc(p.value()))
    };
    let dtstart = instant("DTSTART");
    let due = instant("DUE");
    let completed = instant("COMPLETED");
    let created = instant("CREATED");
    let duration = component
        .property("DURATION")
        .and_then(|p| p.value().as_duration())
        .map(super::Duration::to_chrono);

    let TimeRange { start, end } = *range;
    match (dtstart, duration, due) {
        (Some(dtstart), Some(duration), _) => {
            let until = add(dtstart, duration);
            start <= until && (end > dtstart || end >= until)
        }
        (Some(dtstart), None, Some(due)) => {
            (start < due || start <= dtstart) && (end > dtstart || end >= due)
        }
        (Some(dtstart), None, None) => start <= dtstart && end > dtstart,
        (None, _, Some(due)) => start < due && end >= due,
        (None, _, None) => match (completed, created) {
            (Some(completed), Some(created)) => {
                (start <= created || start <= completed) && (end >= created || end >= completed)
            }
            (Some(completed), None) => start <= completed && end >= completed,
            (None, Some(created)) => end > created,
            (None, None) => true,
        },
    }
}

/// VJOURNAL rule: a DATE spans its day, a DATE-TIME is an instant, and a
/// journal without DTSTART never matches.
pub(super) fn journal(
    component: &Component,
    range: &TimeRange,
    resolver: &DocumentResolver,
) -> bool {
    let Some(dtstart) = component.property("DTSTART") else {
        return false;
    };
    let Some(start) = resolver.value_to_utc(dtstart.value()) else {
        return false;
    };
    let duration = if matches!(dtstart.value(), Value::Date(_)) {
        TimeDelta::days(1)
    } else {
        TimeDelta::zero()
    };
    range.overlaps(start, duration)
}
