use viewloom_core_types::{Scalar, TypeToken};

/// Identifying properties of an incoming reference
///
/// Built by the application engine from the scalar events carried by a
/// `Reference` node, and handed to reference resolvers in place of raw
/// events. Property order follows event order.
#[derive(Debug, Clone)]
pub struct ViewEntity {
    declared: TypeToken,
    properties: Vec<(String, Scalar)>,
}

impl ViewEntity {
    /// Create an empty entity for the declared reference type
    pub fn new(declared: TypeToken) -> Self {
        Self {
            declared,
            properties: Vec::new(),
        }
    }

    /// The declared model type of the reference
    pub fn declared(&self) -> TypeToken {
        self.declared
    }

    /// Add a named scalar property
    pub fn put(&mut self, name: impl Into<String>, value: Scalar) {
        self.properties.push((name.into(), value));
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate properties in event order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check whether the entity carries no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
