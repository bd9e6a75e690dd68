//! Content lines and properties (RFC 5545 §3.1, RFC 6350 §3.3).

use super::parameter::names;
use super::{Parameter, Value, ValueType};

/// A raw content line as read from the text encoding.
///
/// This is the low-level representation before value type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Group prefix (`item1` in `item1.TEL`).
    pub group: Option<String>,
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
    /// Logical line number (1-based) of the first physical line.
    pub line: usize,
    /// Column (1-based) where the raw value starts.
    pub value_column: usize,
}

impl ContentLine {
    /// Creates a new content line.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
            line: 0,
            value_column: 0,
        }
    }

    /// Returns the first parameter with the given name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.is(name))
    }

    /// Returns the first value of a parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name)?.value()
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.param_value(names::VALUE)
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.param_value(names::TZID)
    }
}

/// A property: optional group, name, ordered parameters and one typed value.
///
/// The name is fixed at construction; the component lookup index depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    group: Option<String>,
    name: String,
    params: Vec<Parameter>,
    value: Value,
}

impl Property {
    /// Creates a property. A zoned date-time value adds the matching `TZID`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut property = Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(String::new()),
        };
        property.set_value(value);
        property
    }

    /// Creates a property from already-resolved parts, as the parsers do.
    #[must_use]
    pub fn from_parts(
        group: Option<String>,
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: Value,
    ) -> Self {
        Self {
            group,
            name: name.into().to_ascii_uppercase(),
            params,
            value,
        }
    }

    /// Sets the group prefix.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Adds a parameter, keeping any existing one with the same name.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_param(Parameter::new(name, value));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replaces the value. A zoned date-time value sets `TZID` to match.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        if let Some(tzid) = self.value.tzid().map(str::to_string) {
            self.set_param(names::TZID, tzid);
        }
    }

    /// Returns the parameters in order.
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Returns the first parameter with the given name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.is(name))
    }

    /// Returns the first value of the named parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name)?.value()
    }

    /// Returns every value of every parameter with the given name, in order.
    ///
    /// `TEL;TYPE=home;TYPE=voice,cell` yields `home`, `voice`, `cell`.
    #[must_use]
    pub fn param_values(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.is(name))
            .flat_map(|p| p.values.iter().map(String::as_str))
            .collect()
    }

    /// Appends a parameter; repeated names are allowed.
    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Replaces every parameter with this name by a single-valued one.
    ///
    /// The new parameter takes the position of the first one removed.
    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        let param = Parameter::new(name, value);
        match self.params.iter().position(|p| p.is(name)) {
            Some(index) => {
                self.params[index] = param;
                let mut seen = 0;
                self.params.retain(|p| {
                    if p.is(name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.params.push(param),
        }
    }

    /// Removes every parameter with this name, returning how many were removed.
    pub fn remove_param(&mut self, name: &str) -> usize {
        let before = self.params.len();
        self.params.retain(|p| !p.is(name));
        before - self.params.len()
    }

    /// Value type named by an explicit `VALUE` parameter.
    #[must_use]
    pub fn value_type(&self) -> Option<ValueType> {
        self.param_value(names::VALUE).and_then(ValueType::from_param)
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Address carried by `ATTENDEE`/`ORGANIZER`-style properties.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.value.as_address().or_else(|| self.value.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::DateTime;

    #[test]
    fn property_name_is_uppercased() {
        let prop = Property::new("summary", "Meeting");
        assert_eq!(prop.name(), "SUMMARY");
        assert_eq!(prop.as_text(), Some("Meeting"));
    }

    #[test]
    fn zoned_value_sets_tzid() {
        let prop = Property::new(
            "DTSTART",
            DateTime::zoned(2026, 1, 23, 9, 0, 0, "Europe/Paris"),
        );
        assert_eq!(prop.param_value("tzid"), Some("Europe/Paris"));
    }

    #[test]
    fn repeated_params_flatten_in_order() {
        let mut prop = Property::new("TEL", "+1-555-0100").with_group("item1");
        prop.add_param(Parameter::new("TYPE", "home"));
        prop.add_param(Parameter::with_values(
            "type",
            vec!["voice".into(), "cell".into()],
        ));
        assert_eq!(prop.group(), Some("item1"));
        assert_eq!(prop.param_values("TYPE"), vec!["home", "voice", "cell"]);

        prop.set_param("TYPE", "work");
        assert_eq!(prop.param_values("TYPE"), vec!["work"]);
        assert_eq!(prop.remove_param("type"), 1);
        assert!(prop.params().is_empty());
    }

    #[test]
    fn explicit_value_type() {
        let prop = Property::new("DTSTART", "20111223").with_param("VALUE", "date");
        assert_eq!(prop.value_type(), Some(ValueType::Date));
    }
}
