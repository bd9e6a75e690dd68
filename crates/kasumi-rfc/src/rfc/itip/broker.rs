//! Organizer-side scheduling (RFC 5546, RFC 6638 §3.2).
//!
//! [`Broker::diff`] compares two versions of a scheduled object and returns
//! the messages that bring every attendee up to date. It never fails: a
//! missing `UID` is synthesized, and an object without an organizer or
//! attendees simply needs no messages.

use std::collections::BTreeMap;

use kasumi_core::Settings;
use kasumi_core::constants::PRODUCT_ID;
use uuid::Uuid;

use super::message::{Message, PENDING_STATUS};
use super::method::Method;
use crate::rfc::build::serialize_property;
use crate::rfc::core::{Component, ComponentKind, Property, names};

/// Properties whose change requires attendees to respond again.
const SIGNIFICANT: &[&str] = &[
    "DTSTART", "DTEND", "DURATION", "DUE", "RRULE", "RDATE", "EXDATE", "STATUS", "LOCATION",
    "SUMMARY",
];

/// Broker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerOptions {
    /// Drop messages for attendees who would only learn of insignificant
    /// changes.
    pub suppress_insignificant: bool,
    /// `PRODID` of generated payloads.
    pub product_id: String,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            suppress_insignificant: false,
            product_id: PRODUCT_ID.to_string(),
        }
    }
}

impl From<&Settings> for BrokerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            suppress_insignificant: settings.broker.suppress_insignificant,
            product_id: settings.broker.product_id.clone(),
        }
    }
}

/// Computes iTIP messages from object changes.
#[derive(Debug, Clone, Default)]
pub struct Broker {
    options: BrokerOptions,
}

impl Broker {
    #[must_use]
    pub const fn new(options: BrokerOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &BrokerOptions {
        &self.options
    }

    /// Messages that move attendees from `old` to `new`.
    ///
    /// Either side may be a `VCALENDAR` holding the master and its overrides,
    /// or a bare `VEVENT` / `VTODO` / `VJOURNAL`. `None` for `old` is a
    /// creation, `None` for `new` a deletion.
    ///
    /// Removed attendees get `CANCEL`. Everyone else gets `REQUEST`, flagged
    /// insignificant when neither the attendee set nor any significant
    /// property changed. All messages of one call share one `SEQUENCE`:
    /// the old value plus one when anything significant changed.
    #[must_use]
    #[tracing::instrument(skip(self, old, new), fields(
        old = old.map(Component::name),
        new = new.map(Component::name),
    ))]
    pub fn diff(&self, old: Option<&Component>, new: Option<&Component>) -> Vec<Message> {
        let old = old.map(Scheduled::from_root);
        let new = new.map(Scheduled::from_root);

        let organizer = new
            .as_ref()
            .and_then(Scheduled::organizer)
            .or_else(|| old.as_ref().and_then(Scheduled::organizer));
        let Some(organizer) = organizer else {
            tracing::debug!("No organizer, nothing to schedule");
            return Vec::new();
        };
        let organizer_key = identity(organizer);

        let old_attendees = old
            .as_ref()
            .map(|s| s.attendees(&organizer_key))
            .unwrap_or_default();
        let new_attendees = new
            .as_ref()
            .map(|s| s.attendees(&organizer_key))
            .unwrap_or_default();
        if old_attendees.is_empty() && new_attendees.is_empty() {
            tracing::debug!("No attendees, nothing to schedule");
            return Vec::new();
        }

        let uid = new
            .as_ref()
            .and_then(Scheduled::uid)
            .or_else(|| old.as_ref().and_then(Scheduled::uid))
            .map_or_else(
                || {
                    let uid = Uuid::new_v4().to_string();
                    tracing::warn!(uid = %uid, "Scheduled object has no UID, synthesized one");
                    uid
                },
                str::to_string,
            );

        let fields_changed = match (&old, &new) {
            (Some(old), Some(new)) => old.fingerprint() != new.fingerprint(),
            _ => true,
        };
        let attendees_changed = old_attendees.len() != new_attendees.len()
            || old_attendees
                .iter()
                .any(|a| !new_attendees.iter().any(|b| b.key == a.key));
        let significant = fields_changed || attendees_changed;

        let base = old.as_ref().map_or(0, Scheduled::sequence);
        let mut sequence = if significant { base + 1 } else { base };
        if let Some(new) = &new {
            sequence = sequence.max(new.sequence());
        }

        let mut messages = Vec::new();
        let message = |method: Method,
                       component: &str,
                       recipient: &str,
                       significant_change: bool,
                       payload: &Component| Message {
            uid: uid.clone(),
            component: component.to_string(),
            method,
            sequence,
            sender: organizer.to_string(),
            recipient: recipient.to_string(),
            schedule_status: PENDING_STATUS.to_string(),
            significant_change,
            payload: payload.clone(),
        };

        if let Some(old) = &old {
            let removed: Vec<&Attendee> = old_attendees
                .iter()
                .filter(|a| !new_attendees.iter().any(|b| b.key == a.key))
                .collect();
            if !removed.is_empty() {
                let payload = old.payload(Method::Cancel, &uid, sequence, &self.options.product_id);
                for attendee in removed {
                    tracing::trace!(recipient = %attendee.address, "CANCEL");
                    messages.push(message(Method::Cancel, old.name(), &attendee.address, true, &payload));
                }
            }
        }

        if let Some(new) = &new {
            let payload = new.payload(Method::Request, &uid, sequence, &self.options.product_id);
            for attendee in &new_attendees {
                let known = old_attendees.iter().any(|a| a.key == attendee.key);
                let significant_change = !known || fields_changed;
                if !significant_change && self.options.suppress_insignificant {
                    tracing::trace!(recipient = %attendee.address, "Suppressed insignificant REQUEST");
                    continue;
                }
                tracing::trace!(recipient = %attendee.address, significant_change, "REQUEST");
                messages.push(message(
                    Method::Request,
                    new.name(),
                    &attendee.address,
                    significant_change,
                    &payload,
                ));
            }
        }

        tracing::debug!(messages = messages.len(), sequence, "Scheduling diff computed");
        messages
    }
}

/// Attendee address plus the key it is compared by.
#[derive(Debug)]
struct Attendee {
    address: String,
    key: String,
}

/// Case-insensitive identity of a calendar user address, without `mailto:`.
fn identity(address: &str) -> String {
    let lower = address.trim().to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("mailto:") {
        return rest.to_string();
    }
    lower
}

/// One scheduled object: every instance sharing a UID plus the timezones
/// they may refer to.
struct Scheduled<'a> {
    instances: Vec<&'a Component>,
    timezones: Vec<&'a Component>,
}

impl<'a> Scheduled<'a> {
    fn from_root(root: &'a Component) -> Self {
        if root.kind() != ComponentKind::Calendar {
            return Self {
                instances: vec![root],
                timezones: Vec::new(),
            };
        }
        Self {
            instances: root
                .components()
                .filter(|c| {
                    matches!(
                        c.kind(),
                        ComponentKind::Event | ComponentKind::Todo | ComponentKind::Journal
                    )
                })
                .collect(),
            timezones: root.components_of_kind(ComponentKind::Timezone),
        }
    }

    fn name(&self) -> &'a str {
        self.instances.first().map_or("VEVENT", |c| c.name())
    }

    fn uid(&self) -> Option<&'a str> {
        self.instances.iter().find_map(|c| c.uid())
    }

    fn organizer(&self) -> Option<&'a str> {
        self.instances
            .iter()
            .find_map(|c| c.property("ORGANIZER").and_then(Property::address))
    }

    fn sequence(&self) -> i64 {
        self.instances
            .iter()
            .filter_map(|c| c.property("SEQUENCE").and_then(|p| p.value().as_integer()))
            .max()
            .unwrap_or(0)
    }

    /// Attendees that take server-side scheduling, deduplicated, without the
    /// organizer.
    fn attendees(&self, organizer_key: &str) -> Vec<Attendee> {
        let mut out: Vec<Attendee> = Vec::new();
        for property in self
            .instances
            .iter()
            .flat_map(|c| c.properties_named("ATTENDEE"))
        {
            let Some(address) = property.address() else {
                continue;
            };
            let agent = property.param_value(names::SCHEDULE_AGENT);
            if agent.is_some_and(|a| a.eq_ignore_ascii_case("CLIENT") || a.eq_ignore_ascii_case("NONE")) {
                continue;
            }
            let key = identity(address);
            if key == organizer_key || out.iter().any(|a| a.key == key) {
                continue;
            }
            out.push(Attendee {
                address: address.to_string(),
                key,
            });
        }
        out
    }

    /// Significant properties per instance, keyed by `RECURRENCE-ID`.
    fn fingerprint(&self) -> BTreeMap<String, Vec<String>> {
        self.instances
            .iter()
            .map(|instance| {
                let key = instance
                    .property("RECURRENCE-ID")
                    .map(|p| p.value().format())
                    .unwrap_or_default();
                let mut lines: Vec<String> = SIGNIFICANT
                    .iter()
                    .flat_map(|name| instance.properties_named(name))
                    .map(serialize_property)
                    .collect();
                lines.sort();
                (format!("{}:{key}", instance.name()), lines)
            })
            .collect()
    }

    /// A fresh `VCALENDAR` carrying copies of every instance.
    fn payload(&self, method: Method, uid: &str, sequence: i64, product_id: &str) -> Component {
        let mut calendar = Component::calendar(product_id);
        calendar.set("METHOD", method.as_str());
        for timezone in &self.timezones {
            calendar.add_child((*timezone).clone());
        }
        for instance in &self.instances {
            let mut copy = (*instance).clone();
            for property in copy.properties_mut() {
                property.remove_param(names::SCHEDULE_STATUS);
                property.remove_param(names::SCHEDULE_FORCE_SEND);
            }
            if copy.uid().is_none() {
                copy.set("UID", uid);
            }
            copy.set("SEQUENCE", sequence);
            if method == Method::Cancel {
                copy.set("STATUS", "CANCELLED");
            }
            calendar.add_child(copy);
        }
        calendar
    }
}
