//! Value-type parsers for the text encoding (RFC 5545 §3.3, RFC 6350 §4).
//!
//! Each parser takes the raw (still escaped) value text and returns a typed
//! [`Value`] or a [`ValueError`] naming the failed type. Positions are added
//! by the caller.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

use crate::error::{ValueError, ValueErrorKind};
use crate::rfc::core::{
    Date, DateTime, DateTimeForm, Duration, Frequency, Period, RecurUntil, RecurrenceRule, Time,
    UtcOffset, Value, ValueType, Weekday, WeekdayNum,
};

/// Parses an all-digit field; signs and whitespace are rejected.
fn digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses a DATE value (`YYYYMMDD`).
///
/// ## Errors
/// Returns `InvalidDate` for anything but eight digits naming a real day.
pub fn parse_date(raw: &str) -> Result<Date, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidDate, raw);
    if raw.len() != 8 || !raw.is_ascii() {
        return Err(err());
    }
    let date = Date::new(
        digits(&raw[0..4]).ok_or_else(err)?,
        digits(&raw[4..6]).ok_or_else(err)?,
        digits(&raw[6..8]).ok_or_else(err)?,
    );
    date.to_naive().map(|_| date).ok_or_else(err)
}

/// Parses `HHMMSS` into its three fields, allowing a leap second.
fn clock(raw: &str) -> Option<(u8, u8, u8)> {
    if raw.len() != 6 || !raw.is_ascii() {
        return None;
    }
    let hour = digits(&raw[0..2])?;
    let minute = digits(&raw[2..4])?;
    let second = digits(&raw[4..6])?;
    (hour < 24 && minute < 60 && second <= 60).then_some((hour, minute, second))
}

/// Parses a TIME value (`HHMMSS[Z]`).
///
/// ## Errors
/// Returns `InvalidTime` when the fields are malformed or out of range.
pub fn parse_time(raw: &str) -> Result<Time, ValueError> {
    let (body, is_utc) = strip_utc(raw);
    let (hour, minute, second) =
        clock(body).ok_or_else(|| ValueError::new(ValueErrorKind::InvalidTime, raw))?;
    Ok(Time::new(hour, minute, second, is_utc))
}

fn strip_utc(raw: &str) -> (&str, bool) {
    match raw.strip_suffix(['Z', 'z']) {
        Some(body) => (body, true),
        None => (raw, false),
    }
}

/// Parses a DATE-TIME value (`YYYYMMDDTHHMMSS[Z]`) as floating or UTC.
///
/// ## Errors
/// Returns `InvalidDateTime` when either half is malformed.
pub fn parse_datetime(raw: &str) -> Result<DateTime, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidDateTime, raw);
    let (body, is_utc) = strip_utc(raw);
    let (date, time) = body
        .split_once(['T', 't'])
        .ok_or_else(err)?;
    let date = parse_date(date).map_err(|_| err())?;
    let (hour, minute, second) = clock(time).ok_or_else(err)?;
    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour,
        minute,
        second,
        form: if is_utc {
            DateTimeForm::Utc
        } else {
            DateTimeForm::Floating
        },
    })
}

/// DATE-TIME slot that also accepts a bare DATE.
fn parse_date_or_datetime(raw: &str) -> Result<Value, ValueError> {
    if raw.len() == 8 {
        return parse_date(raw)
            .map(Value::Date)
            .map_err(|_| ValueError::new(ValueErrorKind::InvalidDateTime, raw));
    }
    parse_datetime(raw).map(Value::DateTime)
}

/// Parses a DURATION value (`[+-]P[nW][nD][T[nH][nM][nS]]`).
///
/// Weeks may be combined with days; at least one component is required and a
/// `T` must be followed by a time component.
///
/// ## Errors
/// Returns `InvalidDuration` for any other shape.
pub fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidDuration, raw);
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let rest = rest.strip_prefix(['P', 'p']).ok_or_else(err)?;

    let mut duration = Duration::zero();
    duration.negative = negative;
    let mut number = String::new();
    let mut in_time = false;
    let mut any_date = false;
    let mut any_time = false;

    for c in rest.chars() {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c == 'T' && !in_time && number.is_empty() {
            in_time = true;
            continue;
        }
        let n: u32 = digits(&number).ok_or_else(err)?;
        number.clear();
        match (c, in_time) {
            ('W', false) => duration.weeks = n,
            ('D', false) => duration.days = n,
            ('H', true) => duration.hours = n,
            ('M', true) => duration.minutes = n,
            ('S', true) => duration.seconds = n,
            _ => return Err(err()),
        }
        if in_time {
            any_time = true;
        } else {
            any_date = true;
        }
    }

    if !number.is_empty() || (in_time && !any_time) || !(any_date || any_time) {
        return Err(err());
    }
    Ok(duration)
}

/// Parses a PERIOD value: `start/end` or `start/duration`.
///
/// ## Errors
/// Returns `InvalidPeriod` when either half fails.
pub fn parse_period(raw: &str) -> Result<Period, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidPeriod, raw);
    let (start, end) = raw.split_once('/').ok_or_else(err)?;
    let start = parse_datetime(start).map_err(|_| err())?;
    if end.starts_with(['P', 'p', '+', '-']) {
        let duration = parse_duration(end).map_err(|_| err())?;
        return Ok(Period::from_duration(start, duration));
    }
    let end = parse_datetime(end).map_err(|_| err())?;
    Ok(Period::explicit(start, end))
}

/// Parses a UTC-OFFSET value (`+HHMM[SS]` / `-HHMM[SS]`).
///
/// ## Errors
/// Returns `InvalidUtcOffset` when the sign is missing or a field is out of range.
pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidUtcOffset, raw);
    let sign = match raw.as_bytes().first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(err()),
    };
    let body = &raw[1..];
    if !(body.len() == 4 || body.len() == 6) || !body.is_ascii() {
        return Err(err());
    }
    let hours: i32 = digits(&body[0..2]).ok_or_else(err)?;
    let minutes: i32 = digits(&body[2..4]).ok_or_else(err)?;
    let seconds: i32 = if body.len() == 6 {
        digits(&body[4..6]).ok_or_else(err)?
    } else {
        0
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(err());
    }
    Ok(UtcOffset::from_seconds(
        sign * (hours * 3600 + minutes * 60 + seconds),
    ))
}

/// Parses BOOLEAN (`TRUE` / `FALSE`, any case).
///
/// ## Errors
/// Returns `InvalidBoolean` for anything else.
pub fn parse_boolean(raw: &str) -> Result<bool, ValueError> {
    match raw.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ValueError::new(ValueErrorKind::InvalidBoolean, raw)),
    }
}

/// Parses a signed INTEGER.
///
/// ## Errors
/// Returns `InvalidInteger` when the text is not a 64-bit integer.
pub fn parse_integer(raw: &str) -> Result<i64, ValueError> {
    raw.trim()
        .parse()
        .map_err(|_| ValueError::new(ValueErrorKind::InvalidInteger, raw))
}

/// Parses a FLOAT. Exponents, `inf` and `NaN` are not part of the grammar.
///
/// ## Errors
/// Returns `InvalidFloat` for anything outside `[+-]digits[.digits]`.
pub fn parse_float(raw: &str) -> Result<f64, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidFloat, raw);
    let body = raw.trim().trim_start_matches(['+', '-']);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(err());
    }
    raw.trim().parse().map_err(|_| err())
}

/// Decodes a base64 BINARY value.
///
/// Unfolding a badly folded value can leave whitespace inside the payload;
/// strict mode rejects that, lenient mode strips it.
///
/// ## Errors
/// Returns `InvalidBinary` for whitespace in strict mode or undecodable text.
pub fn parse_binary(raw: &str, strict: bool) -> Result<Vec<u8>, ValueError> {
    let err = || ValueError::new(ValueErrorKind::InvalidBinary, raw);
    let has_whitespace = raw.chars().any(char::is_whitespace);
    if strict && has_whitespace {
        return Err(err());
    }
    let cleaned: String = if has_whitespace {
        raw.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        raw.to_string()
    };
    STANDARD
        .decode(&cleaned)
        .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))
        .map_err(|_| err())
}

/// Parses a RECUR value (RFC 5545 §3.3.10).
///
/// Known parts are range-checked; unrecognized parts are kept as extensions
/// in the order they appear.
///
/// ## Errors
/// Returns a `ValueError` for a missing `FREQ`, a malformed part, an
/// out-of-range number, or both `COUNT` and `UNTIL`.
pub fn parse_recur(raw: &str) -> Result<RecurrenceRule, ValueError> {
    let err = |kind| ValueError::new(kind, raw);
    let mut rule = RecurrenceRule::default();

    for part in raw.split(';').filter(|p| !p.is_empty()) {
        let (name, value) = part
            .split_once('=')
            .ok_or_else(|| err(ValueErrorKind::InvalidRecur))?;
        let name = name.trim().to_ascii_uppercase();
        match name.as_str() {
            "FREQ" => {
                rule.freq = Some(
                    Frequency::parse(value).ok_or_else(|| err(ValueErrorKind::InvalidFrequency))?,
                );
            }
            "INTERVAL" => {
                let interval: u32 =
                    digits(value).ok_or_else(|| err(ValueErrorKind::InvalidRecur))?;
                if interval == 0 {
                    return Err(err(ValueErrorKind::OutOfRange));
                }
                rule.interval = Some(interval);
            }
            "COUNT" => {
                rule.count =
                    Some(digits(value).ok_or_else(|| err(ValueErrorKind::InvalidRecur))?);
            }
            "UNTIL" => {
                rule.until = Some(if value.contains(['T', 't']) {
                    RecurUntil::DateTime(parse_datetime(value)?)
                } else {
                    RecurUntil::Date(parse_date(value)?)
                });
            }
            "WKST" => {
                rule.wkst =
                    Some(Weekday::parse(value).ok_or_else(|| err(ValueErrorKind::InvalidWeekday))?);
            }
            "BYSECOND" => rule.by_second = ranged(raw, value, 0, 60)?,
            "BYMINUTE" => rule.by_minute = ranged(raw, value, 0, 59)?,
            "BYHOUR" => rule.by_hour = ranged(raw, value, 0, 23)?,
            "BYMONTHDAY" => rule.by_monthday = ranged(raw, value, -31, 31)?,
            "BYYEARDAY" => rule.by_yearday = ranged(raw, value, -366, 366)?,
            "BYWEEKNO" => rule.by_weekno = ranged(raw, value, -53, 53)?,
            "BYMONTH" => rule.by_month = ranged(raw, value, 1, 12)?,
            "BYSETPOS" => rule.by_setpos = ranged(raw, value, -366, 366)?,
            "BYDAY" => {
                rule.by_day = value
                    .split(',')
                    .map(|day| parse_weekday_num(raw, day))
                    .collect::<Result<_, _>>()?;
            }
            _ => rule.extensions.push((name, value.to_string())),
        }
    }

    if rule.freq.is_none() {
        return Err(err(ValueErrorKind::InvalidRecur));
    }
    if rule.count.is_some() && rule.until.is_some() {
        return Err(err(ValueErrorKind::UntilCountConflict));
    }
    Ok(rule)
}

/// Parses a comma list of integers within `min..=max`. Signed ranges exclude 0.
fn ranged<T: TryFrom<i64>>(rule: &str, value: &str, min: i64, max: i64) -> Result<Vec<T>, ValueError> {
    value
        .split(',')
        .map(|item| {
            let n: i64 = item
                .trim()
                .parse()
                .map_err(|_| ValueError::new(ValueErrorKind::InvalidRecur, rule))?;
            if n < min || n > max || (min < 0 && n == 0) {
                return Err(ValueError::new(ValueErrorKind::OutOfRange, rule));
            }
            T::try_from(n).map_err(|_| ValueError::new(ValueErrorKind::OutOfRange, rule))
        })
        .collect()
}

/// `MO`, `1MO`, `+2TU`, `-1FR`.
fn parse_weekday_num(rule: &str, raw: &str) -> Result<WeekdayNum, ValueError> {
    let raw = raw.trim();
    if raw.len() < 2 || !raw.is_ascii() {
        return Err(ValueError::new(ValueErrorKind::InvalidWeekday, rule));
    }
    let (ordinal, day) = raw.split_at(raw.len() - 2);
    let weekday =
        Weekday::parse(day).ok_or_else(|| ValueError::new(ValueErrorKind::InvalidWeekday, rule))?;
    if ordinal.is_empty() {
        return Ok(WeekdayNum::every(weekday));
    }
    let ordinal: i8 = ordinal
        .parse()
        .map_err(|_| ValueError::new(ValueErrorKind::OutOfRange, rule))?;
    WeekdayNum::nth(ordinal, weekday).ok_or_else(|| ValueError::new(ValueErrorKind::OutOfRange, rule))
}

/// Removes TEXT escapes (RFC 5545 §3.3.11). `\n` and `\N` become a newline;
/// an unknown escape keeps its backslash.
#[must_use]
pub fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ ('\\' | ';' | ',' | ':' | '"')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits on `sep` where it is not backslash-escaped. Escapes are kept.
#[must_use]
pub fn split_unescaped(raw: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&raw[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&raw[start..]);
    parts
}

/// Parses a structured value: `;` separates fields, `,` separates the
/// components of one field.
#[must_use]
pub fn parse_structured(raw: &str) -> Value {
    Value::Structured(
        split_unescaped(raw, ';')
            .into_iter()
            .map(|field| {
                split_unescaped(field, ',')
                    .into_iter()
                    .map(unescape_text)
                    .collect()
            })
            .collect(),
    )
}

/// Parses one value of the given type.
///
/// A DATE-TIME slot also takes a bare DATE, and a DURATION slot that does not
/// start with `P` or a sign is read as a DATE-TIME (absolute triggers written
/// without `VALUE=DATE-TIME`).
///
/// ## Errors
/// Returns the type's `ValueError` when the text does not match it.
pub fn parse_single(ty: ValueType, raw: &str) -> Result<Value, ValueError> {
    match ty {
        ValueType::Text | ValueType::DateAndOrTime | ValueType::LanguageTag => {
            Ok(Value::Text(unescape_text(raw)))
        }
        ValueType::Uri => Ok(Value::Uri(raw.to_string())),
        ValueType::CalAddress => Ok(Value::CalAddress(raw.to_string())),
        ValueType::Binary => parse_binary(raw, false).map(Value::Binary),
        ValueType::Boolean => parse_boolean(raw).map(Value::Boolean),
        ValueType::Integer => parse_integer(raw).map(Value::Integer),
        ValueType::Float => parse_float(raw).map(Value::Float),
        ValueType::Date => parse_date(raw).map(Value::Date),
        ValueType::DateTime => parse_date_or_datetime(raw),
        ValueType::Timestamp => parse_date_or_datetime(&raw.replace(['-', ':'], "")),
        ValueType::Time => parse_time(raw).map(Value::Time),
        ValueType::Duration if raw.starts_with(['P', 'p', '+', '-']) => {
            parse_duration(raw).map(Value::Duration)
        }
        ValueType::Duration => parse_date_or_datetime(raw)
            .map_err(|_| ValueError::new(ValueErrorKind::InvalidDuration, raw)),
        ValueType::Period => parse_period(raw).map(Value::Period),
        ValueType::Recur => parse_recur(raw).map(|rule| Value::Recur(Box::new(rule))),
        ValueType::UtcOffset => parse_utc_offset(raw).map(Value::UtcOffset),
    }
}

/// Parses a comma-separated list into [`Value::List`].
///
/// Text items split on unescaped commas only. In a DATE-TIME list, an item
/// containing `/` is read as a PERIOD (`RDATE` written without `VALUE=PERIOD`).
///
/// ## Errors
/// Returns the first item's `ValueError`.
pub fn parse_list(ty: ValueType, raw: &str) -> Result<Value, ValueError> {
    let items = match ty {
        ValueType::Text | ValueType::DateAndOrTime | ValueType::LanguageTag => {
            split_unescaped(raw, ',')
        }
        _ => raw.split(',').collect(),
    };
    items
        .into_iter()
        .map(|item| {
            if ty == ValueType::DateTime && item.contains('/') {
                parse_period(item).map(Value::Period)
            } else {
                parse_single(ty, item)
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Whether the value holds a floating DATE-TIME (directly, in a list, or as
/// a period start or end).
#[must_use]
pub fn has_floating(value: &Value) -> bool {
    match value {
        Value::DateTime(dt) => dt.is_floating(),
        Value::Period(Period::Explicit { start, end }) => start.is_floating() || end.is_floating(),
        Value::Period(Period::Duration { start, .. }) => start.is_floating(),
        Value::List(items) => items.iter().any(has_floating),
        _ => false,
    }
}

/// Whether a DATE appears where the slot asked for DATE-TIME.
#[must_use]
pub fn has_date(value: &Value) -> bool {
    match value {
        Value::Date(_) => true,
        Value::List(items) => items.iter().any(has_date),
        _ => false,
    }
}

/// Moves every floating DATE-TIME in the value into `tzid`.
#[must_use]
pub fn zone(value: Value, tzid: &str) -> Value {
    let zoned = |mut dt: DateTime| {
        if dt.is_floating() {
            dt.form = DateTimeForm::Zoned {
                tzid: tzid.to_string(),
            };
        }
        dt
    };
    match value {
        Value::DateTime(dt) => Value::DateTime(zoned(dt)),
        Value::Period(Period::Explicit { start, end }) => {
            Value::Period(Period::explicit(zoned(start), zoned(end)))
        }
        Value::Period(Period::Duration { start, duration }) => {
            Value::Period(Period::from_duration(zoned(start), duration))
        }
        Value::List(items) => Value::List(items.into_iter().map(|v| zone(v, tzid)).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_times() {
        assert_eq!(parse_date("20260131").unwrap(), Date::new(2026, 1, 31));
        assert!(parse_date("20260231").is_err());
        assert!(parse_date("2026-01-31").is_err());

        assert_eq!(parse_time("235960Z").unwrap(), Time::utc(23, 59, 60));
        assert!(parse_time("246000").is_err());

        let dt = parse_datetime("19970714T173000Z").unwrap();
        assert_eq!(dt, DateTime::utc(1997, 7, 14, 17, 30, 0));
        assert!(parse_datetime("19970714T1730").is_err());
        assert_eq!(
            parse_datetime("19970714T173000").unwrap().form,
            DateTimeForm::Floating
        );
    }

    #[test]
    fn bare_date_in_datetime_slot() {
        assert_eq!(
            parse_single(ValueType::DateTime, "20260105").unwrap(),
            Value::Date(Date::new(2026, 1, 5))
        );
        let err = parse_single(ValueType::DateTime, "2026").unwrap_err();
        assert_eq!(err.kind, ValueErrorKind::InvalidDateTime);
    }

    #[test]
    fn durations() {
        let d = parse_duration("-P1W2DT3H4M5S").unwrap();
        assert!(d.negative);
        assert_eq!((d.weeks, d.days, d.hours, d.minutes, d.seconds), (1, 2, 3, 4, 5));
        assert_eq!(parse_duration("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(parse_duration("+P1D").unwrap(), Duration::days(1));
        for bad in ["P", "PT", "P1DT", "1D", "P1H", "PT1D", "P1Y"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn absolute_trigger_in_duration_slot() {
        assert_eq!(
            parse_single(ValueType::Duration, "20260101T090000Z").unwrap(),
            Value::DateTime(DateTime::utc(2026, 1, 1, 9, 0, 0))
        );
    }

    #[test]
    fn periods() {
        let p = parse_period("19970101T180000Z/PT5H30M").unwrap();
        assert!(matches!(p, Period::Duration { .. }));
        let p = parse_period("19970101T180000Z/19970102T070000Z").unwrap();
        assert_eq!(p.to_string(), "19970101T180000Z/19970102T070000Z");
        assert!(parse_period("19970101T180000Z").is_err());
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(parse_utc_offset("-0500").unwrap().as_seconds(), -5 * 3600);
        assert_eq!(parse_utc_offset("+013045").unwrap().as_seconds(), 5445);
        assert!(parse_utc_offset("0500").is_err());
        assert!(parse_utc_offset("+2500").is_err());
    }

    #[test]
    fn scalars() {
        assert!(parse_boolean("true").unwrap());
        assert!(parse_boolean("yes").is_err());
        assert_eq!(parse_integer("-42").unwrap(), -42);
        assert!(parse_integer("4x").is_err());
        assert!((parse_float("-3.25").unwrap() + 3.25).abs() < f64::EPSILON);
        assert!(parse_float("1e5").is_err());
        assert!(parse_float("NaN").is_err());
    }

    #[test]
    fn binary_whitespace_policy() {
        assert_eq!(parse_binary("aGVsbG8=", true).unwrap(), b"hello");
        assert!(parse_binary("aGVs bG8=", true).is_err());
        assert_eq!(parse_binary("aGVs bG8=", false).unwrap(), b"hello");
        assert!(parse_binary("***", false).is_err());
    }

    #[test]
    fn recurrence_rules() {
        let rule = parse_recur("FREQ=MONTHLY;BYDAY=-1FR,2MO;BYSETPOS=-1;COUNT=10;X-NAME=v").unwrap();
        assert_eq!(rule.freq, Some(Frequency::Monthly));
        assert_eq!(rule.by_day.len(), 2);
        assert_eq!(rule.by_day[0].ordinal, Some(-1));
        assert_eq!(rule.by_setpos, vec![-1]);
        assert_eq!(rule.extensions, vec![("X-NAME".to_string(), "v".to_string())]);

        let rule = parse_recur("FREQ=DAILY;UNTIL=20260101").unwrap();
        assert!(matches!(rule.until, Some(RecurUntil::Date(_))));
    }

    #[test]
    fn recurrence_rule_errors() {
        let kind = |s| parse_recur(s).unwrap_err().kind;
        assert_eq!(kind("COUNT=3"), ValueErrorKind::InvalidRecur);
        assert_eq!(kind("FREQ=SOMETIMES"), ValueErrorKind::InvalidFrequency);
        assert_eq!(kind("FREQ=DAILY;BYHOUR=24"), ValueErrorKind::OutOfRange);
        assert_eq!(kind("FREQ=DAILY;BYMONTHDAY=0"), ValueErrorKind::OutOfRange);
        assert_eq!(kind("FREQ=DAILY;INTERVAL=0"), ValueErrorKind::OutOfRange);
        assert_eq!(kind("FREQ=WEEKLY;BYDAY=XX"), ValueErrorKind::InvalidWeekday);
        assert_eq!(
            kind("FREQ=DAILY;COUNT=2;UNTIL=20260101T000000Z"),
            ValueErrorKind::UntilCountConflict
        );
    }

    #[test]
    fn text_escapes() {
        assert_eq!(unescape_text("a\\,b\\;c\\\\d\\ne\\Nf"), "a,b;c\\d\ne\nf");
        assert_eq!(unescape_text("keep\\x"), "keep\\x");
        assert_eq!(split_unescaped("a\\,b,c", ','), vec!["a\\,b", "c"]);
    }

    #[test]
    fn structured_and_lists() {
        assert_eq!(
            parse_structured("Doe;John,J.;;Dr\\;;"),
            Value::Structured(vec![
                vec!["Doe".into()],
                vec!["John".into(), "J.".into()],
                vec![String::new()],
                vec!["Dr;".into()],
                vec![String::new()],
            ])
        );

        let categories = parse_list(ValueType::Text, "a\\,b,c").unwrap();
        assert_eq!(
            categories,
            Value::List(vec![Value::text("a,b"), Value::text("c")])
        );

        let rdate = parse_list(
            ValueType::DateTime,
            "19970101T180000Z/PT1H,19970102T180000Z",
        )
        .unwrap();
        let items: Vec<_> = rdate.iter().collect();
        assert!(matches!(items[0], Value::Period(_)));
        assert!(matches!(items[1], Value::DateTime(_)));
    }

    #[test]
    fn zoning_floating_values() {
        let value = parse_list(ValueType::DateTime, "20260101T090000,20260102T090000Z").unwrap();
        assert!(has_floating(&value));
        let zoned = zone(value, "Europe/Berlin");
        let items: Vec<_> = zoned.iter().collect();
        assert_eq!(
            items[0].as_datetime().and_then(DateTime::tzid),
            Some("Europe/Berlin")
        );
        assert!(items[1].as_datetime().is_some_and(DateTime::is_utc));
    }
}
