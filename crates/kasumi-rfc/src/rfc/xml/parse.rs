//! xCal / xCard reader.

use std::collections::{HashMap, HashSet};

use super::element::{self, Element};
use super::error::{XmlError, XmlErrorKind, XmlResult};
use super::namespace::Namespace;
use super::value::parse_value;
use crate::error::{ValueError, ValueErrorKind};
use crate::rfc::core::{Component, Parameter, Property, Value, ValueType, names, registry};
use crate::rfc::parse::values;
use crate::rfc::parse::{Diagnostic, ParseOptions};

/// Reads the first document of an xCal or xCard stream with lenient options.
///
/// ## Errors
/// Returns an error for malformed XML, an unknown namespace, or a stream
/// without a `vcalendar` / `vcard` element.
pub fn parse_xml(input: &str) -> XmlResult<Component> {
    let (documents, _) = parse_xml_with(input, &ParseOptions::default())?;
    documents
        .into_iter()
        .next()
        .ok_or_else(|| XmlError::missing_element("vcalendar"))
}

/// Reads every document of an xCal (`<icalendar>`) or xCard (`<vcards>`)
/// stream, with the diagnostics collected on the way. A bare `<vcalendar>`
/// or `<vcard>` root is accepted as a stream of one. Diagnostic lines are
/// the lines of the XML input.
///
/// ## Errors
/// Returns an error for malformed XML, an unknown namespace, an unexpected
/// root, nesting deeper than `options.max_depth`, or no documents. In strict
/// mode invalid values and unresolved timezones are errors too.
#[tracing::instrument(skip(input, options), fields(input_len = input.len(), strict = options.strict))]
pub fn parse_xml_with(
    input: &str,
    options: &ParseOptions,
) -> XmlResult<(Vec<Component>, Vec<Diagnostic>)> {
    let root = element::read(input, options.max_depth.saturating_mul(2).saturating_add(6))?;
    let uri = root.namespace.clone().unwrap_or_default();
    let ns = Namespace::from_uri(&uri).ok_or_else(|| XmlError::unsupported_namespace(&uri))?;

    let documents: Vec<&Element> = if root.name == ns.container() {
        root.children_named(ns.root())
            .filter(|child| in_namespace(child, ns))
            .collect()
    } else if root.name == ns.root() {
        vec![&root]
    } else {
        return Err(XmlError::unexpected_element(&root.name));
    };
    if documents.is_empty() {
        return Err(XmlError::missing_element(ns.root()));
    }

    let mut reader = XmlReader {
        options,
        ns,
        document_tzids: HashSet::new(),
        known_tzids: HashMap::new(),
        diagnostics: Vec::new(),
    };
    let components = documents
        .into_iter()
        .map(|document| {
            reader.document_tzids.clear();
            collect_tzids(document, &mut reader.document_tzids);
            reader.component(document, 1)
        })
        .collect::<XmlResult<Vec<_>>>()?;
    tracing::debug!(
        documents = components.len(),
        diagnostics = reader.diagnostics.len(),
        "xml documents parsed"
    );
    Ok((components, reader.diagnostics))
}

fn in_namespace(element: &Element, ns: Namespace) -> bool {
    element.namespace.as_deref() == Some(ns.uri())
}

/// `TZID`s defined by the `vtimezone` components of one document.
fn collect_tzids(element: &Element, out: &mut HashSet<String>) {
    if element.name == "vtimezone"
        && let Some(tzid) = element.child("properties").and_then(|p| p.child("tzid"))
    {
        out.extend(tzid.children.iter().map(|value| value.text.trim().to_string()));
    }
    for child in &element.children {
        collect_tzids(child, out);
    }
}

struct XmlReader<'a> {
    options: &'a ParseOptions,
    ns: Namespace,
    document_tzids: HashSet<String>,
    known_tzids: HashMap<String, bool>,
    diagnostics: Vec<Diagnostic>,
}

impl XmlReader<'_> {
    fn component(&mut self, element: &Element, depth: usize) -> XmlResult<Component> {
        if depth > self.options.max_depth {
            return Err(XmlError::new(
                XmlErrorKind::DepthExceeded,
                format!("limit {}", self.options.max_depth),
            ));
        }
        let ns = self.ns;
        let mut component = Component::named(element.name.to_ascii_uppercase());
        match ns {
            Namespace::XCal => {
                if let Some(properties) = element.child("properties") {
                    for child in properties.children.iter().filter(|c| in_namespace(c, ns)) {
                        let property = self.property(child, None)?;
                        component.add_child(property);
                    }
                }
                if let Some(components) = element.child("components") {
                    for child in components.children.iter().filter(|c| in_namespace(c, ns)) {
                        let nested = self.component(child, depth + 1)?;
                        component.add_child(nested);
                    }
                }
            }
            Namespace::XCard => {
                for child in element.children.iter().filter(|c| in_namespace(c, ns)) {
                    if child.name == "group" {
                        let group = child.attribute("name").map(str::to_string);
                        for grouped in child.children.iter().filter(|c| in_namespace(c, ns)) {
                            let property = self.property(grouped, group.clone())?;
                            component.add_child(property);
                        }
                    } else {
                        let property = self.property(child, None)?;
                        component.add_child(property);
                    }
                }
            }
        }
        Ok(component)
    }

    fn property(&mut self, element: &Element, group: Option<String>) -> XmlResult<Property> {
        let ns = self.ns;
        let name = element.name.to_ascii_uppercase();
        let kind = ns.document();

        let mut params: Vec<Parameter> = element
            .child("parameters")
            .map(|parameters| {
                parameters
                    .children
                    .iter()
                    .map(|param| {
                        let values = if param.children.is_empty() {
                            vec![param.text.trim().to_string()]
                        } else {
                            param.children.iter().map(|v| v.text.clone()).collect()
                        };
                        Parameter::with_values(param.name.as_str(), values)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let value_elements: Vec<&Element> = element
            .children
            .iter()
            .filter(|c| c.name != "parameters" && in_namespace(c, ns))
            .collect();

        let mut value = match parse_value(kind, &name, &value_elements, ns) {
            Ok(value) => value,
            Err(err) if self.options.strict => return Err(XmlError::invalid_value(&name, &err)),
            Err(err) => {
                tracing::warn!(property = %name, error = %err, "Value kept as text");
                let text = value_elements
                    .iter()
                    .map(|e| e.text.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                self.diagnostics.push(Diagnostic::ValueFallback {
                    line: element.line,
                    property: name.clone(),
                    error: err,
                });
                Value::Text(text)
            }
        };

        if !params.iter().any(|p| p.is(names::VALUE)) && !registry::is_text_like(&value) {
            let default = registry::default_value_type(kind, &name);
            let actual = value.value_type();
            if registry::canonical(actual) != registry::canonical(default) {
                if actual == ValueType::Binary && !params.iter().any(|p| p.is(names::ENCODING)) {
                    let encoding = match ns {
                        Namespace::XCal => "BASE64",
                        Namespace::XCard => "b",
                    };
                    params.push(Parameter::new(names::ENCODING, encoding));
                }
                params.push(Parameter::new(names::VALUE, actual.as_str()));
            }
        }

        let tzid = params
            .iter()
            .find(|p| p.is(names::TZID))
            .and_then(Parameter::value)
            .map(str::to_string);
        if let Some(tzid) = tzid
            && values::has_floating(&value)
        {
            if self.is_known_tzid(&tzid) {
                value = values::zone(value, &tzid);
            } else if self.options.strict {
                return Err(XmlError::invalid_value(
                    &name,
                    &ValueError::new(ValueErrorKind::UnresolvedTimezone, tzid),
                ));
            } else {
                tracing::warn!(property = %name, tzid = %tzid, "Unresolved TZID, keeping floating time");
                self.diagnostics.push(Diagnostic::TimezoneUnresolved {
                    line: element.line,
                    tzid,
                });
            }
        }

        Ok(Property::from_parts(group, name, params, value))
    }

    fn is_known_tzid(&mut self, tzid: &str) -> bool {
        if self.document_tzids.contains(tzid) {
            return true;
        }
        if let Some(&known) = self.known_tzids.get(tzid) {
            return known;
        }
        let known = self.options.provider.resolve(tzid).is_some();
        self.known_tzids.insert(tzid.to_string(), known);
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{ComponentKind, DateTime};

    const XCAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0">
  <vcalendar>
    <properties>
      <prodid><text>-//Example Inc.//Example Calendar//EN</text></prodid>
      <version><text>2.0</text></version>
    </properties>
    <components>
      <vevent>
        <properties>
          <dtstamp><date-time>2008-02-05T19:12:24Z</date-time></dtstamp>
          <dtstart>
            <parameters><tzid><text>America/New_York</text></tzid></parameters>
            <date-time>2008-10-06T09:00:00</date-time>
          </dtstart>
          <summary><text>Planning meeting</text></summary>
          <uid><text>4088E990AD89CB3DBB484909</text></uid>
          <exdate><date>2008-10-13</date></exdate>
        </properties>
      </vevent>
    </components>
  </vcalendar>
</icalendar>"#;

    #[test_log::test]
    fn reads_rfc_6321_sample() {
        let calendar = parse_xml(XCAL).unwrap();
        assert_eq!(calendar.kind(), ComponentKind::Calendar);
        assert_eq!(calendar.text("VERSION"), Some("2.0"));
        let event = calendar.component("VEVENT").unwrap();
        assert_eq!(event.text("SUMMARY"), Some("Planning meeting"));
        assert_eq!(
            event.property("DTSTART").unwrap().value(),
            &Value::DateTime(DateTime::zoned(2008, 10, 6, 9, 0, 0, "America/New_York"))
        );
        let exdate = event.property("EXDATE").unwrap();
        assert_eq!(exdate.param_value("VALUE"), Some("DATE"));
    }

    #[test_log::test]
    fn reads_grouped_xcard_properties() {
        let xml = r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0">
  <vcard>
    <version><text>4.0</text></version>
    <fn><text>J. Doe</text></fn>
    <group name="item1">
      <email><text>j@example.com</text></email>
    </group>
    <x:note xmlns:x="urn:example:other"><x:text>ignored</x:text></x:note>
  </vcard>
</vcards>"#;
        let card = parse_xml(xml).unwrap();
        assert_eq!(card.kind(), ComponentKind::Card);
        let email = card.property("EMAIL").unwrap();
        assert_eq!(email.group(), Some("item1"));
        assert!(card.property("NOTE").is_none());
    }

    #[test]
    fn rejects_foreign_namespace_and_empty_stream() {
        let err = parse_xml(r#"<icalendar xmlns="urn:example"/>"#).unwrap_err();
        assert_eq!(err.kind, XmlErrorKind::UnsupportedNamespace);

        let err = parse_xml(r#"<icalendar xmlns="urn:ietf:params:xml:ns:icalendar-2.0"/>"#)
            .unwrap_err();
        assert_eq!(err.kind, XmlErrorKind::MissingElement);
    }

    #[test_log::test]
    fn strict_mode_rejects_bad_values_and_unknown_zones() {
        let bad = XCAL.replace("2008-02-05T19:12:24Z", "yesterday");
        let err = parse_xml_with(&bad, &ParseOptions::strict()).unwrap_err();
        assert_eq!(
            err.kind,
            XmlErrorKind::InvalidValue(ValueErrorKind::InvalidDateTime)
        );
        let lenient = parse_xml(&bad).unwrap();
        let event = lenient.component("VEVENT").unwrap();
        assert_eq!(event.text("DTSTAMP"), Some("yesterday"));

        let unknown = XCAL.replace("America/New_York", "Mars/Olympus");
        let err = parse_xml_with(&unknown, &ParseOptions::strict()).unwrap_err();
        assert_eq!(
            err.kind,
            XmlErrorKind::InvalidValue(ValueErrorKind::UnresolvedTimezone)
        );
    }

    #[test_log::test]
    fn lenient_recoveries_are_reported() {
        let input = XCAL
            .replace("2008-02-05T19:12:24Z", "yesterday")
            .replace("America/New_York", "Nowhere/Special");
        let (documents, diagnostics) = parse_xml_with(&input, &ParseOptions::default()).unwrap();
        let event = documents[0].component("VEVENT").unwrap();
        assert_eq!(
            event.property("DTSTART").unwrap().value(),
            &Value::DateTime(DateTime::floating(2008, 10, 6, 9, 0, 0))
        );

        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::ValueFallback { line: 11, property, error }
                if property == "DTSTAMP" && error.kind == ValueErrorKind::InvalidDateTime
        ));
        assert_eq!(
            diagnostics[1],
            Diagnostic::TimezoneUnresolved {
                line: 12,
                tzid: "Nowhere/Special".into()
            }
        );

        let (_, clean) = parse_xml_with(XCAL, &ParseOptions::default()).unwrap();
        assert!(clean.is_empty());
    }
}
