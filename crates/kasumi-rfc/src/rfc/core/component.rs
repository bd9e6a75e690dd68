//! Components (RFC 5545 §3.4-3.6, RFC 6350 §6).

use std::collections::HashMap;

use super::time_range::TimeRange;
use super::{ComponentKind, Node, Property, Value, registry};
use crate::error::{StructureError, UsageError};
use crate::rfc::tz::DocumentResolver;

/// A component: a name plus properties and sub-components in document order.
///
/// Children are owned exclusively and keep the order they were added in.
/// A name index maps each child name to its positions so named lookups do
/// not scan the whole child list; every mutation through this type keeps it
/// current.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: ComponentKind,
    name: String,
    children: Vec<Node>,
    index: HashMap<String, Vec<usize>>,
}

impl Component {
    /// Creates a new component with the given kind.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            name: kind.as_str().to_string(),
            children: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a component by name; unrecognized names keep their own name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_uppercase();
        let kind = ComponentKind::parse(&name);
        Self {
            kind,
            name,
            children: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a VCALENDAR with `VERSION:2.0` and the given `PRODID`.
    #[must_use]
    pub fn calendar(prodid: impl Into<String>) -> Self {
        let mut root = Self::new(ComponentKind::Calendar);
        root.add("VERSION", "2.0");
        root.add("PRODID", prodid.into());
        root
    }

    /// Creates a VCARD with `VERSION:4.0`.
    #[must_use]
    pub fn card() -> Self {
        let mut card = Self::new(ComponentKind::Card);
        card.add("VERSION", "4.0");
        card
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Creates a VTODO component.
    #[must_use]
    pub fn todo() -> Self {
        Self::new(ComponentKind::Todo)
    }

    /// Creates a VJOURNAL component.
    #[must_use]
    pub fn journal() -> Self {
        Self::new(ComponentKind::Journal)
    }

    /// Creates a VTIMEZONE component.
    #[must_use]
    pub fn timezone() -> Self {
        Self::new(ComponentKind::Timezone)
    }

    /// Creates a VALARM component.
    #[must_use]
    pub fn alarm() -> Self {
        Self::new(ComponentKind::Alarm)
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All children in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Property children in document order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.children.iter().filter_map(Node::as_property)
    }

    /// Component children in document order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.children.iter().filter_map(Node::as_component)
    }

    /// Mutable component children in document order.
    ///
    /// Names are fixed, so the parent's index stays valid; replacing a child
    /// wholesale with a differently named one hides it from named lookups.
    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.children.iter_mut().filter_map(Node::as_component_mut)
    }

    /// Mutable property children in document order.
    pub fn properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.children.iter_mut().filter_map(Node::as_property_mut)
    }

    /// Appends a child, returning its position.
    pub fn add_child(&mut self, child: impl Into<Node>) -> usize {
        let child = child.into();
        let position = self.children.len();
        self.index
            .entry(child.name().to_ascii_uppercase())
            .or_default()
            .push(position);
        self.children.push(child);
        position
    }

    /// Appends a property built through the registry, returning its position.
    ///
    /// Repeated calls accumulate: adding `ATTENDEE` twice leaves two.
    pub fn add(&mut self, name: &str, value: impl Into<Value>) -> usize {
        let property = registry::create_property(self.kind.document(), name, value.into());
        self.add_child(property)
    }

    /// Replaces every property with this name by a single new one.
    ///
    /// `GROUP.NAME` only replaces properties in that group.
    ///
    /// The replacement takes the position of the first property removed, or
    /// is appended when none existed. Returns that position.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> usize {
        let property = registry::create_property(self.kind.document(), name, value.into());
        let (group, _) = split_group(name);
        let positions: Vec<usize> = self
            .positions(property.name(), group)
            .into_iter()
            .filter(|&i| self.children[i].as_property().is_some())
            .collect();

        let Some((&first, rest)) = positions.split_first() else {
            return self.add_child(property);
        };

        self.children[first] = Node::Property(property);
        for &position in rest.iter().rev() {
            self.children.remove(position);
        }
        self.reindex();
        first
    }

    /// Removes the first child equal to `node`.
    ///
    /// ## Errors
    /// Returns `UsageError::NotAChild` when no child matches.
    pub fn remove_child(&mut self, node: &Node) -> Result<Node, UsageError> {
        let position = self
            .positions(node.name(), None)
            .into_iter()
            .find(|&i| &self.children[i] == node)
            .ok_or_else(|| UsageError::NotAChild {
                parent: self.name.clone(),
            })?;
        self.remove_at(position)
    }

    /// Removes the child at `position`.
    ///
    /// ## Errors
    /// Returns `UsageError::IndexOutOfRange` for a position past the end.
    pub fn remove_at(&mut self, position: usize) -> Result<Node, UsageError> {
        if position >= self.children.len() {
            return Err(UsageError::IndexOutOfRange {
                parent: self.name.clone(),
                index: position,
                len: self.children.len(),
            });
        }
        let node = self.children.remove(position);
        self.reindex();
        Ok(node)
    }

    /// Removes every child with this name (`GROUP.NAME` narrows to a group).
    pub fn remove(&mut self, name: &str) -> Vec<Node> {
        let (group, name) = split_group(name);
        let positions = self.positions(name, group);
        if positions.is_empty() {
            return Vec::new();
        }
        let mut removed: Vec<Node> = positions
            .iter()
            .rev()
            .map(|&i| self.children.remove(i))
            .collect();
        removed.reverse();
        self.reindex();
        removed
    }

    /// First child with this name (`GROUP.NAME` narrows to a group).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        let (group, name) = split_group(name);
        self.positions(name, group)
            .first()
            .map(|&i| &self.children[i])
    }

    /// Every child with this name, in document order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&Node> {
        let (group, name) = split_group(name);
        self.positions(name, group)
            .into_iter()
            .map(|i| &self.children[i])
            .collect()
    }

    /// First property with this name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.get_all(name).into_iter().find_map(Node::as_property)
    }

    /// First property with this name, mutably.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        let (group, name) = split_group(name);
        let position = self
            .positions(name, group)
            .into_iter()
            .find(|&i| self.children[i].as_property().is_some())?;
        self.children[position].as_property_mut()
    }

    /// Every property with this name, in document order.
    #[must_use]
    pub fn properties_named(&self, name: &str) -> Vec<&Property> {
        self.get_all(name)
            .into_iter()
            .filter_map(Node::as_property)
            .collect()
    }

    /// First sub-component with this name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.get_all(name).into_iter().find_map(Node::as_component)
    }

    /// Every sub-component with this name, in document order.
    #[must_use]
    pub fn components_named(&self, name: &str) -> Vec<&Component> {
        self.get_all(name)
            .into_iter()
            .filter_map(Node::as_component)
            .collect()
    }

    /// Sub-components of a kind.
    #[must_use]
    pub fn components_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.components().filter(|c| c.kind == kind).collect()
    }

    /// Text of the first property with this name.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name)?.as_text()
    }

    /// Returns the UID property value if present.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.text("UID")
    }

    /// Whether the effective occurrence intersects `range`, resolving zones
    /// through the IANA database only and reading floating times as UTC.
    ///
    /// Use [`super::Cursor::is_in_time_range`] for the document's VTIMEZONEs, or
    /// `ParseOptions::resolver_for` for the configured default timezone.
    ///
    /// ## Errors
    /// Returns `UsageError::WrongKind` unless this is a VEVENT, VTODO or VJOURNAL.
    pub fn is_in_time_range(&self, range: &TimeRange) -> Result<bool, UsageError> {
        self.is_in_time_range_with(range, &DocumentResolver::default())
    }

    /// Same as [`Component::is_in_time_range`] with an explicit resolver.
    ///
    /// ## Errors
    /// Returns `UsageError::WrongKind` unless this is a VEVENT, VTODO or VJOURNAL.
    pub fn is_in_time_range_with(
        &self,
        range: &TimeRange,
        resolver: &DocumentResolver,
    ) -> Result<bool, UsageError> {
        self.kind.behavior().time_range(self, range, resolver)
    }

    /// Structure errors in this component and every descendant.
    #[must_use]
    pub fn validate(&self) -> Vec<StructureError> {
        let mut errors = Vec::new();
        self.validate_into(&mut errors);
        errors
    }

    fn validate_into(&self, errors: &mut Vec<StructureError>) {
        self.kind.behavior().validate(self, errors);
        for child in self.components() {
            child.validate_into(errors);
        }
    }

    fn positions(&self, name: &str, group: Option<&str>) -> Vec<usize> {
        let key = name.to_ascii_uppercase();
        self.index
            .get(&key)
            .map(|positions| {
                positions
                    .iter()
                    .copied()
                    .filter(|&i| {
                        let child = &self.children[i];
                        child.name().eq_ignore_ascii_case(&key)
                            && group.is_none_or(|g| {
                                child.group().is_some_and(|cg| cg.eq_ignore_ascii_case(g))
                            })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, child) in self.children.iter().enumerate() {
            self.index
                .entry(child.name().to_ascii_uppercase())
                .or_default()
                .push(position);
        }
    }
}

/// Splits `GROUP.NAME` into its parts.
fn split_group(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((group, rest)) => (Some(group), rest),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_add_accumulates() {
        let mut event = Component::event();
        event.set("SUMMARY", "A");
        event.set("SUMMARY", "B");
        let summaries = event.properties_named("SUMMARY");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].as_text(), Some("B"));

        event.add("ATTENDEE", "mailto:x@example.org");
        event.add("ATTENDEE", "mailto:y@example.org");
        let attendees: Vec<_> = event
            .properties_named("attendee")
            .into_iter()
            .filter_map(Property::address)
            .collect();
        assert_eq!(attendees, vec!["mailto:x@example.org", "mailto:y@example.org"]);
    }

    #[test]
    fn set_keeps_position_of_first_match() {
        let mut event = Component::event();
        event.add("UID", "1");
        event.add("CATEGORIES", "a");
        event.add("DESCRIPTION", "d");
        event.add("CATEGORIES", "b");

        event.set("CATEGORIES", "c");
        let names: Vec<_> = event.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["UID", "CATEGORIES", "DESCRIPTION"]);
        assert_eq!(event.get_all("CATEGORIES").len(), 1);
    }

    #[test]
    fn add_and_set_report_positions() {
        let mut calendar = Component::calendar("-//test//EN");
        assert_eq!(calendar.add_child(Component::named("X-THING")), 2);
        assert_eq!(calendar.add("X-THING", "one"), 3);
        assert_eq!(calendar.add("X-THING", "two"), 4);

        // Same-named components are left alone.
        assert_eq!(calendar.set("X-THING", "three"), 3);
        assert_eq!(calendar.children().len(), 4);
        assert!(calendar.children()[2].as_component().is_some());
        assert_eq!(calendar.text("X-THING"), Some("three"));

        assert_eq!(calendar.set("X-OTHER", "new"), 4);
    }

    #[test]
    fn children_keep_interleaved_order() {
        let mut calendar = Component::calendar("-//test//EN");
        calendar.add_child(Component::event());
        calendar.add("X-WR-CALNAME", "Work");
        calendar.add_child(Component::todo());

        let names: Vec<_> = calendar.children().iter().map(Node::name).collect();
        assert_eq!(
            names,
            vec!["VERSION", "PRODID", "VEVENT", "X-WR-CALNAME", "VTODO"]
        );
        assert_eq!(calendar.components_of_kind(ComponentKind::Event).len(), 1);
    }

    #[test]
    fn remove_child_requires_membership() {
        let mut event = Component::event();
        event.add("SUMMARY", "Lunch");
        let stranger = Node::Property(Property::new("SUMMARY", "Dinner"));
        assert!(matches!(
            event.remove_child(&stranger),
            Err(UsageError::NotAChild { .. })
        ));

        let own = Node::Property(Property::new("SUMMARY", "Lunch"));
        assert!(event.remove_child(&own).is_ok());
        assert!(event.get("SUMMARY").is_none());
        assert!(matches!(
            event.remove_at(3),
            Err(UsageError::IndexOutOfRange { index: 3, len: 0, .. })
        ));
    }

    #[test]
    fn remove_by_name_reindexes() {
        let mut event = Component::event();
        event.add("ATTENDEE", "mailto:a@example.org");
        event.add("SUMMARY", "x");
        event.add("ATTENDEE", "mailto:b@example.org");

        let removed = event.remove("ATTENDEE");
        assert_eq!(removed.len(), 2);
        assert_eq!(event.text("SUMMARY"), Some("x"));
        assert_eq!(event.children().len(), 1);
    }

    #[test]
    fn grouped_lookup() {
        let mut card = Component::card();
        card.add_child(Property::new("TEL", "+1-555-0100").with_group("home"));
        card.add_child(Property::new("TEL", "+1-555-0199").with_group("work"));

        assert_eq!(card.get_all("TEL").len(), 2);
        let work = card.property("WORK.TEL").and_then(Property::as_text);
        assert_eq!(work, Some("+1-555-0199"));
        assert_eq!(card.remove("home.TEL").len(), 1);
        assert_eq!(card.get_all("TEL").len(), 1);
    }

    #[test]
    fn time_range_on_wrong_kind_is_usage_error() {
        let card = Component::card();
        let range = TimeRange::new(chrono::DateTime::UNIX_EPOCH, chrono::Utc::now());
        assert!(matches!(
            card.is_in_time_range(&range),
            Err(UsageError::WrongKind { .. })
        ));
    }
}
