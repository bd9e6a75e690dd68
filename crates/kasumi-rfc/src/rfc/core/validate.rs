//! Per-kind structural checks, run recursively by [`Component::validate`].

use super::{Component, ComponentKind};
use crate::error::StructureError;

fn require(component: &Component, property: &'static str, errors: &mut Vec<StructureError>) {
    if component.property(property).is_none() {
        errors.push(StructureError::MissingProperty {
            component: component.name().to_string(),
            property,
        });
    }
}

fn exclusive(
    component: &Component,
    first: &'static str,
    second: &'static str,
    errors: &mut Vec<StructureError>,
) {
    if component.property(first).is_some() && component.property(second).is_some() {
        errors.push(StructureError::MutuallyExclusive {
            component: component.name().to_string(),
            first,
            second,
        });
    }
}

pub(super) fn calendar(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "PRODID", errors);
    require(component, "VERSION", errors);
}

fn schedulable(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "UID", errors);
    require(component, "DTSTAMP", errors);
}

pub(super) fn event(component: &Component, errors: &mut Vec<StructureError>) {
    schedulable(component, errors);
    exclusive(component, "DTEND", "DURATION", errors);
}

pub(super) fn todo(component: &Component, errors: &mut Vec<StructureError>) {
    schedulable(component, errors);
    exclusive(component, "DUE", "DURATION", errors);
}

pub(super) fn journal(component: &Component, errors: &mut Vec<StructureError>) {
    schedulable(component, errors);
}

pub(super) fn timezone(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "TZID", errors);
    let has_observance = component
        .components()
        .any(|c| matches!(c.kind(), ComponentKind::Standard | ComponentKind::Daylight));
    if !has_observance {
        errors.push(StructureError::MissingComponent {
            component: component.name().to_string(),
            child: "STANDARD or DAYLIGHT",
        });
    }
}

pub(super) fn observance(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "DTSTART", errors);
    require(component, "TZOFFSETFROM", errors);
    require(component, "TZOFFSETTO", errors);
}

pub(super) fn alarm(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "ACTION", errors);
    require(component, "TRIGGER", errors);
}

pub(super) fn card(component: &Component, errors: &mut Vec<StructureError>) {
    require(component, "VERSION", errors);
    require(component, "FN", errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{DateTime, Duration};

    #[test]
    fn event_without_uid_and_with_both_end_forms() {
        let mut event = Component::event();
        event.add("DTSTAMP", DateTime::utc(2026, 1, 1, 0, 0, 0));
        event.add("DTEND", DateTime::utc(2026, 1, 1, 1, 0, 0));
        event.add("DURATION", Duration::hours(1));

        let errors = event.validate();
        assert_eq!(
            errors,
            vec![
                StructureError::MissingProperty {
                    component: "VEVENT".to_string(),
                    property: "UID",
                },
                StructureError::MutuallyExclusive {
                    component: "VEVENT".to_string(),
                    first: "DTEND",
                    second: "DURATION",
                },
            ]
        );
    }

    #[test]
    fn validation_is_recursive() {
        let mut calendar = Component::calendar("-//test//EN");
        let mut tz = Component::timezone();
        tz.add("TZID", "Custom/Zone");
        calendar.add_child(tz);

        let errors = calendar.validate();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            StructureError::MissingComponent { component, .. } if component == "VTIMEZONE"
        ));
    }

    #[test]
    fn card_requires_fn() {
        let card = Component::card();
        assert_eq!(card.validate().len(), 1);
    }
}
