//! Document-scoped timezone lookups and UTC conversion of tree values.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};

use super::{IanaProvider, TimezoneProvider, TimezoneRules, VTimezone};
use crate::rfc::core::{Component, ComponentKind, Date, DateTime, DateTimeForm, UtcOffset, Value};

/// Resolves `TZID`s against a document's VTIMEZONEs, then a provider.
///
/// Floating times and dates are read in the default timezone (UTC unless
/// configured otherwise).
#[derive(Debug, Clone)]
pub struct DocumentResolver {
    timezones: HashMap<String, VTimezone>,
    provider: Arc<dyn TimezoneProvider>,
    default_tz: TimezoneRules,
}

impl Default for DocumentResolver {
    fn default() -> Self {
        Self::new(Arc::new(IanaProvider))
    }
}

impl DocumentResolver {
    /// Creates a resolver with no document timezones.
    #[must_use]
    pub fn new(provider: Arc<dyn TimezoneProvider>) -> Self {
        Self {
            timezones: HashMap::new(),
            provider,
            default_tz: TimezoneRules::Fixed(UtcOffset::UTC),
        }
    }

    /// Creates an IANA-backed resolver that knows the root's VTIMEZONEs.
    #[must_use]
    pub fn for_document(root: &Component) -> Self {
        Self::default().with_document(root)
    }

    /// Registers every VTIMEZONE directly under `root`.
    ///
    /// Malformed definitions are skipped with a warning; lookups for their
    /// `TZID` fall through to the provider.
    #[must_use]
    pub fn with_document(mut self, root: &Component) -> Self {
        for component in root.components_of_kind(ComponentKind::Timezone) {
            match VTimezone::from_component(component) {
                Ok(vtz) => self.register(vtz),
                Err(err) => tracing::warn!(error = %err, "ignoring malformed VTIMEZONE"),
            }
        }
        self
    }

    /// Sets the zone used for floating times and dates.
    #[must_use]
    pub fn with_default_timezone(mut self, rules: TimezoneRules) -> Self {
        self.default_tz = rules;
        self
    }

    /// Sets the default zone by identifier; unknown identifiers keep UTC.
    #[must_use]
    pub fn with_default_timezone_id(self, id: &str) -> Self {
        match self.resolve(id) {
            Some(rules) => self.with_default_timezone(rules),
            None => {
                tracing::warn!(timezone = id, "unknown default timezone, using UTC");
                self
            }
        }
    }

    /// Adds a document timezone, replacing one with the same `TZID`.
    pub fn register(&mut self, vtimezone: VTimezone) {
        self.timezones.insert(vtimezone.tzid.clone(), vtimezone);
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn TimezoneProvider> {
        &self.provider
    }

    /// Rules for a `TZID`: document definitions first, then the provider.
    #[must_use]
    pub fn resolve(&self, tzid: &str) -> Option<TimezoneRules> {
        if let Some(vtz) = self.timezones.get(tzid) {
            return Some(TimezoneRules::Document(Box::new(vtz.clone())));
        }
        self.provider.resolve(tzid)
    }

    /// Converts a wall-clock time of the given form to UTC.
    ///
    /// A `TZID` nobody can resolve is read in the default timezone.
    #[must_use]
    pub fn local_to_utc(&self, local: NaiveDateTime, form: &DateTimeForm) -> chrono::DateTime<Utc> {
        match form {
            DateTimeForm::Utc => local.and_utc(),
            DateTimeForm::Floating => self.default_tz.to_utc(local),
            DateTimeForm::Zoned { tzid } => {
                if let Some(vtz) = self.timezones.get(tzid) {
                    return vtz.to_utc(local);
                }
                match self.provider.resolve(tzid) {
                    Some(rules) => rules.to_utc(local),
                    None => {
                        tracing::debug!(tzid, "unresolved TZID treated as floating");
                        self.default_tz.to_utc(local)
                    }
                }
            }
        }
    }

    /// UTC instant of a DATE-TIME, `None` if its fields are out of range.
    #[must_use]
    pub fn to_utc(&self, dt: &DateTime) -> Option<chrono::DateTime<Utc>> {
        Some(self.local_to_utc(dt.to_naive()?, &dt.form))
    }

    /// Start of a DATE in the default timezone.
    #[must_use]
    pub fn date_to_utc(&self, date: &Date) -> Option<chrono::DateTime<Utc>> {
        let midnight = date.to_naive()?.and_hms_opt(0, 0, 0)?;
        Some(self.default_tz.to_utc(midnight))
    }

    /// UTC instant of a DATE or DATE-TIME value.
    #[must_use]
    pub fn value_to_utc(&self, value: &Value) -> Option<chrono::DateTime<Utc>> {
        match value {
            Value::DateTime(dt) => self.to_utc(dt),
            Value::Date(d) => self.date_to_utc(d),
            _ => None,
        }
    }
}
