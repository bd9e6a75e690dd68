//! xCal / xCard writer.

use kasumi_core::DocumentKind;

use super::element::{self, Element};
use super::error::{XmlError, XmlResult};
use super::namespace::Namespace;
use super::value::value_elements;
use crate::rfc::core::{Component, ComponentKind, Node, Parameter, Property, Value, names};

/// Writes one document as an xCal or xCard stream.
///
/// ## Errors
/// Returns an error when the component is not a `VCALENDAR` or `VCARD`.
pub fn to_xml(component: &Component) -> XmlResult<String> {
    to_xml_all(std::slice::from_ref(component))
}

/// Writes several documents of one family into a single stream.
///
/// Properties of a calendar component are written before its
/// sub-components. Grouped vCard properties are gathered under one
/// `<group>` element per group name.
///
/// ## Errors
/// Returns an error for an empty slice, a component that is not a document,
/// or documents of mixed families.
#[tracing::instrument(skip(components), fields(documents = components.len()))]
pub fn to_xml_all(components: &[Component]) -> XmlResult<String> {
    let first = components
        .first()
        .ok_or_else(|| XmlError::missing_element("vcalendar"))?;
    let kind = first.kind().document();
    let ns = Namespace::for_document(kind);

    let mut container = Element::new(ns.container()).with_attribute("xmlns", ns.uri());
    for component in components {
        let is_document = matches!(component.kind(), ComponentKind::Calendar | ComponentKind::Card);
        if !is_document || component.kind().document() != kind {
            return Err(XmlError::unexpected_element(component.name()));
        }
        container.push(component_element(component, ns));
    }
    let out = element::write(&container)?;
    tracing::debug!(octets = out.len(), "xml written");
    Ok(out)
}

fn component_element(component: &Component, ns: Namespace) -> Element {
    let kind = ns.document();
    let mut element = Element::new(component.name().to_ascii_lowercase());
    match ns {
        Namespace::XCal => {
            let mut properties = Element::new("properties");
            let mut components = Element::new("components");
            for child in component.children() {
                match child {
                    Node::Property(property) => properties.push(property_element(kind, property, ns)),
                    Node::Component(nested) => components.push(component_element(nested, ns)),
                }
            }
            if !properties.children.is_empty() {
                element.push(properties);
            }
            if !components.children.is_empty() {
                element.push(components);
            }
        }
        Namespace::XCard => {
            for property in component.properties() {
                let property_xml = property_element(kind, property, ns);
                let Some(group) = property.group() else {
                    element.push(property_xml);
                    continue;
                };
                let existing = element
                    .children
                    .iter_mut()
                    .find(|c| c.name == "group" && c.attribute("name") == Some(group));
                match existing {
                    Some(group_element) => group_element.push(property_xml),
                    None => {
                        let mut group_element = Element::new("group").with_attribute("name", group);
                        group_element.push(property_xml);
                        element.push(group_element);
                    }
                }
            }
        }
    }
    element
}

fn property_element(kind: DocumentKind, property: &Property, ns: Namespace) -> Element {
    let mut element = Element::new(property.name().to_ascii_lowercase());
    let binary = matches!(property.value(), Value::Binary(_));
    // An unregistered VALUE type cannot be re-derived from the value element.
    let unknown = matches!(property.value(), Value::Unknown(_));

    let mut parameters = Element::new("parameters");
    for param in property.params() {
        if (param.is(names::VALUE) && !unknown) || (binary && param.is(names::ENCODING)) {
            continue;
        }
        parameters.push(parameter_element(param));
    }
    if !parameters.children.is_empty() {
        element.push(parameters);
    }

    for value in value_elements(kind, property.name(), property.value(), ns) {
        element.push(value);
    }
    element
}

fn parameter_element(param: &Parameter) -> Element {
    let value_type = param_value_type(&param.name);
    let mut element = Element::new(param.name.to_ascii_lowercase());
    for value in &param.values {
        element.push(Element::with_text(value_type, value.as_str()));
    }
    element
}

/// Value element used inside a parameter (RFC 6321 §3.5).
fn param_value_type(name: &str) -> &'static str {
    match name {
        "ALTREP" | "DIR" => "uri",
        "DELEGATED-FROM" | "DELEGATED-TO" | "MEMBER" | "SENT-BY" => "cal-address",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::DateTime;
    use crate::rfc::xml::parse_xml;

    #[test_log::test]
    fn writes_wrappers_and_extended_dates() {
        let mut calendar = Component::calendar("-//Test//EN");
        let mut event = Component::event();
        event.add("UID", "e1");
        event.add("DTSTART", DateTime::zoned(2026, 1, 5, 9, 0, 0, "Europe/Berlin"));
        event.add_child(
            Property::new("ATTENDEE", Value::CalAddress("mailto:a@example.com".into()))
                .with_param("DELEGATED-FROM", "mailto:b@example.com"),
        );
        calendar.add_child(event);

        let xml = to_xml(&calendar).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<icalendar xmlns=\"urn:ietf:params:xml:ns:icalendar-2.0\">"));
        assert!(xml.contains("<date-time>2026-01-05T09:00:00</date-time>"));
        assert!(xml.contains("<tzid><text>Europe/Berlin</text></tzid>"));
        assert!(
            xml.contains("<delegated-from><cal-address>mailto:b@example.com</cal-address></delegated-from>")
        );

        let back = parse_xml(&xml).unwrap();
        assert_eq!(back, calendar);
    }

    #[test]
    fn groups_vcard_properties() {
        let mut card = Component::card();
        card.add("FN", "Jane");
        card.add_child(Property::new("EMAIL", "jane@example.com").with_group("work"));
        card.add_child(Property::new("TEL", "+1-555").with_group("work"));
        let xml = to_xml(&card).unwrap();
        assert!(xml.contains("<group name=\"work\"><email>"));
        assert_eq!(xml.matches("<group").count(), 1);
    }

    #[test]
    fn rejects_non_documents_and_mixed_families() {
        assert!(to_xml(&Component::event()).is_err());
        assert!(to_xml_all(&[]).is_err());
        let err = to_xml_all(&[Component::calendar("-//A//EN"), Component::card()]).unwrap_err();
        assert_eq!(err.kind, super::super::error::XmlErrorKind::UnexpectedElement);
    }

    #[test]
    fn binary_drops_encoding_and_value() {
        let mut calendar = Component::calendar("-//Test//EN");
        let mut event = Component::event();
        event.add_child(
            Property::new("ATTACH", Value::Binary(b"hi".to_vec()))
                .with_param("ENCODING", "BASE64")
                .with_param("VALUE", "BINARY"),
        );
        calendar.add_child(event);
        let xml = to_xml(&calendar).unwrap();
        assert!(xml.contains("<attach><binary>aGk=</binary></attach>"));

        let back = parse_xml(&xml).unwrap();
        let attach = back.component("VEVENT").unwrap().property("ATTACH").unwrap();
        assert_eq!(attach.param_value("ENCODING"), Some("BASE64"));
        assert_eq!(attach.param_value("VALUE"), Some("BINARY"));
        assert_eq!(attach.value(), &Value::Binary(b"hi".to_vec()));
    }

    #[test]
    fn unregistered_value_type_is_kept() {
        let mut calendar = Component::calendar("-//Test//EN");
        let mut event = Component::event();
        event.add_child(
            Property::new("X-SHAPE", Value::Unknown("raw;data".into())).with_param("VALUE", "X-ODD"),
        );
        calendar.add_child(event);
        let xml = to_xml(&calendar).unwrap();
        assert!(xml.contains(
            "<x-shape><parameters><value><text>X-ODD</text></value></parameters><unknown>raw;data</unknown></x-shape>"
        ));

        let back = parse_xml(&xml).unwrap();
        assert_eq!(back, calendar);
    }
}
