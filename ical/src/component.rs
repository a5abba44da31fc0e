// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Generic component carrier handed out by the document readers.

use std::mem;

use crate::property::Property;
use crate::warning::Warning;

/// A component with its properties and child components.
///
/// No validation is performed; any name and any mix of properties is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Component name, casing as read or given.
    pub name: String,
    /// Properties in document order.
    pub properties: Vec<Property>,
    /// Child components in document order.
    pub components: Vec<Component>,
}

impl Component {
    /// Create an empty component.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Append a property.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Append a child component.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// First property with the given name, ignoring case.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.is(name))
    }

    /// All properties with the given name, ignoring case.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties.iter().filter(move |p| p.is(name))
    }

    /// Whether the name matches, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

// Deep trees are torn down with an explicit stack.
impl Drop for Component {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.components);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.components);
        }
    }
}

/// Components read from an xCal or jCal document, with the warnings raised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Top-level components.
    pub components: Vec<Component>,
    /// Warnings in the order they were raised.
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;

    #[test]
    fn property_lookup_ignores_case() {
        let event = Component::new("VEVENT")
            .with_property(Property::new("Summary", PropertyValue::Text("a".into())))
            .with_property(Property::new("SUMMARY", PropertyValue::Text("b".into())));
        assert_eq!(event.property("summary").and_then(|p| p.value.as_text()), Some("a"));
        assert_eq!(event.properties_named("SUMMARY").count(), 2);
        assert!(event.property("DTSTART").is_none());
    }

    #[test]
    fn deep_tree_drops_without_overflow() {
        let mut root = Component::new("X-ROOT");
        let mut cursor = &mut root;
        for _ in 0..100_000 {
            cursor.components.push(Component::new("X-CHILD"));
            cursor = &mut cursor.components[0];
        }
        drop(root);
    }
}
