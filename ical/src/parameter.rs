// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property parameters as an ordered, case-insensitive multimap.
//!
//! Parameter names are stored upper-cased. Each name keeps its values in the
//! order they were added, plus a marker recording whether it also appeared
//! valueless, such as `;RSVP` written without `=`.

mod data_type;

use std::fmt;

pub use crate::parameter::data_type::DataType;

use crate::keyword::{KW_ENCODING, KW_TZID, KW_VALUE};

/// Ordered multimap of property parameters.
#[derive(Debug, Clone, Default, Eq)]
pub struct Parameters {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    values: Vec<String>,
    valueless: bool,
}

impl Entry {
    fn new(name: &str, values: Vec<String>, valueless: bool) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            values,
            valueless,
        }
    }
}

impl Parameters {
    /// Create an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.position(name).and_then(|i| self.entries.get(i))
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.position(name).and_then(|i| self.entries.get_mut(i))
    }

    /// First value of the parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values of the parameter, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entry(name).map_or(&[], |e| e.values.as_slice())
    }

    /// Whether the parameter is present, with or without values.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Whether the parameter appeared without a value, possibly next to
    /// occurrences with values.
    #[must_use]
    pub fn is_valueless(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.valueless)
    }

    /// Append a value to the parameter, creating it if needed.
    ///
    /// A valueless marker already recorded for the name is kept.
    pub fn put(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entry_mut(name) {
            Some(entry) => entry.values.push(value),
            None => self.entries.push(Entry::new(name, vec![value], false)),
        }
    }

    /// Record that the parameter appeared without a value. Values already
    /// recorded for the name are kept.
    pub fn put_valueless(&mut self, name: &str) {
        match self.entry_mut(name) {
            Some(entry) => entry.valueless = true,
            None => self.entries.push(Entry::new(name, Vec::new(), true)),
        }
    }

    /// Replace the parameter with a single value, clearing any valueless
    /// marker.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entry_mut(name) {
            Some(entry) => {
                entry.values = vec![value];
                entry.valueless = false;
            }
            None => self.entries.push(Entry::new(name, vec![value], false)),
        }
    }

    /// Remove the parameter, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|i| self.entries.remove(i).values)
    }

    /// Iterate `(NAME, values)` pairs in insertion order. A purely valueless
    /// parameter has no values; see [`Parameters::is_valueless`] for the
    /// marker on the others.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.values.as_slice()))
    }

    /// The `VALUE` parameter as a data type.
    #[must_use]
    pub fn value_type(&self) -> Option<DataType> {
        self.get(KW_VALUE).and_then(|v| v.parse().ok())
    }

    /// Set or clear the `VALUE` parameter.
    pub fn set_value_type(&mut self, data_type: Option<&str>) {
        match data_type {
            Some(name) => self.replace(KW_VALUE, name),
            None => {
                self.remove(KW_VALUE);
            }
        }
    }

    /// The `TZID` parameter.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get(KW_TZID)
    }

    /// The `ENCODING` parameter.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.get(KW_ENCODING)
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|e| other.entry(&e.name).is_some_and(|o| o.values == e.values && o.valueless == e.valueless))
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.put(name.as_ref(), value);
        }
        params
    }
}

impl fmt::Display for Parameters {
    /// Debug-friendly rendering, without quoting or escaping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            if e.valueless {
                write!(f, ";{}", e.name)?;
            }
            if !e.values.is_empty() {
                write!(f, ";{}={}", e.name, e.values.join(","))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut params = Parameters::new();
        params.put("tzid", "America/New_York");
        assert_eq!(params.get("TZID"), Some("America/New_York"));
        assert_eq!(params.tzid(), Some("America/New_York"));
        assert_eq!(params.iter().next().map(|(n, _)| n), Some("TZID"));
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let mut params = Parameters::new();
        params.put("MEMBER", "a");
        params.put("member", "b");
        params.put("CN", "x");
        assert_eq!(params.get_all("MEMBER"), ["a", "b"]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn valueless_marker() {
        let mut params = Parameters::new();
        params.put_valueless("rsvp");
        assert!(params.contains("RSVP"));
        assert!(params.is_valueless("RSVP"));
        assert_eq!(params.get("RSVP"), None);
        assert_eq!(params.to_string(), ";RSVP");
    }

    #[test]
    fn valueless_marker_survives_later_values() {
        let mut params = Parameters::new();
        params.put_valueless("X-FLAG");
        params.put("x-flag", "a");
        assert!(params.is_valueless("X-FLAG"));
        assert_eq!(params.get_all("X-FLAG"), ["a"]);
        assert_eq!(params.to_string(), ";X-FLAG;X-FLAG=a");

        let mut other = Parameters::new();
        other.put("X-FLAG", "a");
        assert_ne!(params, other);
        other.put_valueless("X-FLAG");
        assert_eq!(params, other);

        params.replace("X-FLAG", "b");
        assert!(!params.is_valueless("X-FLAG"));
    }

    #[test]
    fn equality_ignores_name_order_but_not_value_order() {
        let a: Parameters = [("A", "1"), ("B", "2"), ("B", "3")].into_iter().collect();
        let b: Parameters = [("b", "2"), ("b", "3"), ("a", "1")].into_iter().collect();
        let c: Parameters = [("A", "1"), ("B", "3"), ("B", "2")].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn value_type_roundtrip() {
        let mut params = Parameters::new();
        params.set_value_type(Some("DATE"));
        assert_eq!(params.value_type(), Some(DataType::Date));
        params.set_value_type(None);
        assert!(params.is_empty());
    }
}
