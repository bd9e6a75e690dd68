//! Tree nodes and borrowed navigation with ancestor context.

use super::{Component, ComponentKind, Property, TimeRange, names};
use crate::error::UsageError;
use crate::rfc::tz::DocumentResolver;

/// A child of a component: either a sub-component or a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Component(Component),
    Property(Property),
}

impl Node {
    /// Uppercase name of the component or property.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Component(c) => c.name(),
            Self::Property(p) => p.name(),
        }
    }

    /// Group prefix; components never carry one.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Component(_) => None,
            Self::Property(p) => p.group(),
        }
    }

    #[must_use]
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Self::Component(c) => Some(c),
            Self::Property(_) => None,
        }
    }

    #[must_use]
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Self::Property(p) => Some(p),
            Self::Component(_) => None,
        }
    }

    pub fn as_component_mut(&mut self) -> Option<&mut Component> {
        match self {
            Self::Component(c) => Some(c),
            Self::Property(_) => None,
        }
    }

    pub fn as_property_mut(&mut self) -> Option<&mut Property> {
        match self {
            Self::Property(p) => Some(p),
            Self::Component(_) => None,
        }
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<Property> for Node {
    fn from(property: Property) -> Self {
        Self::Property(property)
    }
}

/// A borrowed position in a tree that remembers how it got there.
///
/// The tree owns its children top-down and nodes hold no parent pointers;
/// the cursor carries the ancestor chain instead, so contextual lookups such
/// as finding the VTIMEZONE a `DTSTART` refers to walk back up through it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    root: &'a Component,
    ancestors: Vec<&'a Component>,
    node: CursorNode<'a>,
}

#[derive(Debug, Clone, Copy)]
enum CursorNode<'a> {
    Component(&'a Component),
    Property(&'a Property),
}

impl<'a> Cursor<'a> {
    /// Places a cursor on a root component.
    #[must_use]
    pub fn root_of(root: &'a Component) -> Self {
        Self {
            root,
            ancestors: Vec::new(),
            node: CursorNode::Component(root),
        }
    }

    /// Component under the cursor, if it is on one.
    #[must_use]
    pub fn component(&self) -> Option<&'a Component> {
        match self.node {
            CursorNode::Component(c) => Some(c),
            CursorNode::Property(_) => None,
        }
    }

    /// Property under the cursor, if it is on one.
    #[must_use]
    pub fn property(&self) -> Option<&'a Property> {
        match self.node {
            CursorNode::Property(p) => Some(p),
            CursorNode::Component(_) => None,
        }
    }

    /// Number of ancestors above the node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Moves to the child at `index` of the component under the cursor.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Self> {
        let current = self.component()?;
        let node = match current.children().get(index)? {
            Node::Component(c) => CursorNode::Component(c),
            Node::Property(p) => CursorNode::Property(p),
        };
        let mut ancestors = self.ancestors.clone();
        ancestors.push(current);
        Some(Self {
            root: self.root,
            ancestors,
            node,
        })
    }

    /// Moves to the first child with this name.
    #[must_use]
    pub fn child_named(&self, name: &str) -> Option<Self> {
        let current = self.component()?;
        let index = current
            .children()
            .iter()
            .position(|n| n.name().eq_ignore_ascii_case(name))?;
        self.child(index)
    }

    /// Cursor on the parent component, `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let mut ancestors = self.ancestors.clone();
        let parent = ancestors.pop()?;
        Some(Self {
            root: self.root,
            ancestors,
            node: CursorNode::Component(parent),
        })
    }

    /// The root component of the tree.
    #[must_use]
    pub const fn root(&self) -> &'a Component {
        self.root
    }

    /// VTIMEZONE with this `TZID` among the root's components.
    #[must_use]
    pub fn find_timezone(&self, tzid: &str) -> Option<&'a Component> {
        self.root()
            .components_of_kind(ComponentKind::Timezone)
            .into_iter()
            .find(|tz| tz.text("TZID") == Some(tzid))
    }

    /// Time-range query on the component under the cursor, resolving `TZID`s
    /// through the root's VTIMEZONEs before the IANA database.
    ///
    /// ## Errors
    /// Returns `UsageError::WrongKind` unless the cursor is on a VEVENT, VTODO
    /// or VJOURNAL.
    pub fn is_in_time_range(&self, range: &TimeRange) -> Result<bool, UsageError> {
        let Some(component) = self.component() else {
            return Err(UsageError::WrongKind {
                operation: "time-range query",
                component: self.property().map(Property::name).unwrap_or_default().to_string(),
            });
        };
        component.is_in_time_range_with(range, &DocumentResolver::for_document(self.root))
    }

    /// VTIMEZONE referenced by the `TZID` parameter of the property under the cursor.
    #[must_use]
    pub fn referenced_timezone(&self) -> Option<&'a Component> {
        let tzid = self.property()?.param_value(names::TZID)?;
        self.find_timezone(tzid)
    }
}
