//! Key definitions.
//!
//! A [`KeyDef`] names the columns that identify one row of a table for
//! UPDATE, DELETE and refresh. Positions are 1-based.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Ordered list of key column names.
///
/// Serializes as a plain list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyDef {
    attributes: Vec<String>,
}

impl KeyDef {
    /// Creates an empty key definition.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    /// Builds the key from the primary key columns of `schema`, in
    /// ordinal order.
    #[must_use]
    pub fn from_primary_keys(schema: &Schema) -> Self {
        schema
            .primary_keys()
            .into_iter()
            .map(|col| col.name.clone())
            .collect()
    }

    /// Appends an attribute.
    #[must_use]
    pub fn attrib(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Appends an attribute in place.
    pub fn push(&mut self, name: impl Into<String>) {
        self.attributes.push(name.into());
    }

    /// Attribute at 1-based `position`. Position 0 yields the first one.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.attributes
            .get(position.saturating_sub(1))
            .map(String::as_str)
    }

    /// Returns true if `name` is a key attribute, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true when there is no key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over attribute names in key order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Copies the attributes into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.attributes.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for KeyDef {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for KeyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("KeyDef{empty}");
        }
        write!(f, "KeyDef{{{}}}", self.attributes.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based_positions() {
        let key = KeyDef::new().attrib("app").attrib("tipo").attrib("codice_vero");
        assert_eq!(key.len(), 3);
        assert_eq!(key.get(1), Some("app"));
        assert_eq!(key.get(0), Some("app"));
        assert_eq!(key.get(3), Some("codice_vero"));
        assert_eq!(key.get(4), None);
    }

    #[test]
    fn test_contains_ignores_case() {
        let key: KeyDef = ["APP", "tipo"].into_iter().collect();
        assert!(key.contains("app"));
        assert!(!key.contains("codice_app"));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyDef::new().to_string(), "KeyDef{empty}");
        assert_eq!(KeyDef::new().attrib("a").attrib("b").to_string(), "KeyDef{a,b}");
    }

    #[test]
    fn test_serializes_as_name_list() {
        let key = KeyDef::new().attrib("app").attrib("tipo");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["app","tipo"]"#);

        let parsed: KeyDef = serde_json::from_str(r#"["app","tipo","codice_vero"]"#).unwrap();
        assert_eq!(parsed.get(3), Some("codice_vero"));
        assert_eq!(parsed.to_string(), "KeyDef{app,tipo,codice_vero}");
    }
}
