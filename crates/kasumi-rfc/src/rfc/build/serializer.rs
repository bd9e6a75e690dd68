//! Tree-to-text serializer (RFC 5545 §3.1, RFC 6350 §3.2).
//!
//! Children are written in tree order, parameters in stored order. Values use
//! their canonical text form (see [`crate::rfc::core::Value::format`]).

use std::fmt::Write;

use kasumi_core::Settings;
use kasumi_core::constants::DEFAULT_LINE_OCTETS;

use super::fold::fold_line_at;
use crate::rfc::core::{Component, Node, Parameter, Property, names};

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Longest physical output line in octets, excluding CRLF.
    pub line_octets: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            line_octets: DEFAULT_LINE_OCTETS,
        }
    }
}

impl From<&Settings> for SerializeOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            line_octets: settings.serializer.line_octets,
        }
    }
}

/// Serializes a component tree with default options.
#[must_use]
pub fn serialize(component: &Component) -> String {
    serialize_with(component, &SerializeOptions::default())
}

/// Serializes a component tree, folding at `options.line_octets`.
#[must_use]
#[tracing::instrument(skip(component, options), fields(component = component.name(), line_octets = options.line_octets))]
pub fn serialize_with(component: &Component, options: &SerializeOptions) -> String {
    let mut out = String::new();
    write_component(&mut out, component, options.line_octets);
    tracing::debug!(octets = out.len(), "Serialized document");
    out
}

/// Serializes one property as a folded content line ending in CRLF.
#[must_use]
pub fn serialize_property(property: &Property) -> String {
    fold_line_at(&logical_line(property), DEFAULT_LINE_OCTETS)
}

fn write_component(out: &mut String, component: &Component, width: usize) {
    out.push_str(&fold_line_at(&format!("BEGIN:{}", component.name()), width));
    for child in component.children() {
        match child {
            Node::Property(property) => out.push_str(&fold_line_at(&logical_line(property), width)),
            Node::Component(nested) => write_component(out, nested, width),
        }
    }
    out.push_str(&fold_line_at(&format!("END:{}", component.name()), width));
}

/// The unfolded `[group.]NAME[;params]:value` line.
fn logical_line(property: &Property) -> String {
    let mut line = String::new();
    if let Some(group) = property.group() {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(property.name());
    for param in property.params() {
        let _ = write!(line, ";{param}");
    }
    if property.param(names::TZID).is_none()
        && let Some(tzid) = property.value().tzid()
    {
        let _ = write!(line, ";{}", Parameter::new(names::TZID, tzid));
    }
    line.push(':');
    line.push_str(&property.value().format());
    line
}
