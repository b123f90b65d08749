//! Per-element custom property scopes.
//!
//! A [`StyleScope`] is the set of custom properties declared directly on one
//! element, the equivalent of the element's inline `style` restricted to
//! `--*` properties. Properties are kept sorted by name so rendering is
//! deterministic.

use std::collections::BTreeMap;

/// Custom properties declared on a single element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleScope {
    properties: BTreeMap<String, String>,
}

impl StyleScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `property` (including the `--` prefix) to `value`.
    ///
    /// Returns `false` when the property already had exactly this value.
    pub fn set(&mut self, property: &str, value: &str) -> bool {
        match self.properties.get(property) {
            Some(existing) if existing == value => false,
            _ => {
                self.properties.insert(property.to_string(), value.to_string());
                true
            }
        }
    }

    /// Removes `property`. Returns `false` if it was not declared.
    pub fn remove(&mut self, property: &str) -> bool {
        self.properties.remove(property).is_some()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates `(property, value)` pairs in property-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the scope as declaration text, e.g. `--a: 1px; --b: red;`.
    pub fn to_css_text(&self) -> String {
        self.iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_changes() {
        let mut scope = StyleScope::new();
        assert!(scope.set("--gap", "4px"));
        assert!(!scope.set("--gap", "4px"));
        assert!(scope.set("--gap", "8px"));
        assert_eq!(scope.get("--gap"), Some("8px"));
    }

    #[test]
    fn test_remove() {
        let mut scope = StyleScope::new();
        scope.set("--gap", "4px");
        assert!(scope.remove("--gap"));
        assert!(!scope.remove("--gap"));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_to_css_text_sorted() {
        let mut scope = StyleScope::new();
        scope.set("--z-index", "3");
        scope.set("--accent", "#ff0000");
        insta::assert_snapshot!(scope.to_css_text(), @"--accent: #ff0000; --z-index: 3;");
    }
}
