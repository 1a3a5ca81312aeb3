use serde::{Deserialize, Serialize};
use viewloom_core_types::Scalar;

/// Ordered name-to-value properties wrapping a view
///
/// Entries keep insertion order; putting an existing name replaces the
/// value in place without changing its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    entries: Vec<(String, Scalar)>,
}

impl Envelope {
    /// Create a new empty envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a property, replacing an existing entry with the same name
    pub fn put(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the envelope holds no properties
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
