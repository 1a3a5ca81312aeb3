use viewloom_core_types::TypeToken;

use crate::errors::{Result, ViewLoomError};

/// Name/value pair identifying a concrete subtype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub name: String,
    pub value: String,
}

/// Maps between runtime subtypes and discriminator values
///
/// `candidates` is always the set of subtype branch tokens declared by the
/// polymorphic node being processed — the explicit registry that replaces
/// language-level subtype checks. Implementations must fail fast when the
/// runtime type is not among the candidates.
pub trait DiscriminatorStrategy: Send + Sync {
    /// Derive the discriminator for a concrete runtime subtype
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `runtime` is not a declared subtype of `declared`.
    fn to_discriminator(
        &self,
        declared: TypeToken,
        runtime: TypeToken,
        candidates: &[TypeToken],
    ) -> Result<Discriminator>;

    /// Map a discriminator value back to a concrete subtype
    ///
    /// # Errors
    ///
    /// `DiscriminatorUnresolvable` if no candidate maps to `value`.
    fn to_subtype(
        &self,
        declared: TypeToken,
        value: &str,
        candidates: &[TypeToken],
    ) -> Result<TypeToken>;
}

/// Default strategy deriving discriminator values from simple type names
///
/// Transforms are applied in a fixed order: strip prefix, strip suffix,
/// then decapitalize. Decapitalize lowers only the first character and
/// leaves a name whose first two characters are both uppercase unchanged,
/// so acronym-led names like `OTHERModel` survive intact.
#[derive(Debug, Clone)]
pub struct SimpleNameStrategy {
    attribute: String,
    strip_prefix: Option<String>,
    strip_suffix: Option<String>,
    decapitalize: bool,
}

impl Default for SimpleNameStrategy {
    fn default() -> Self {
        Self {
            attribute: "type".to_string(),
            strip_prefix: None,
            strip_suffix: None,
            decapitalize: false,
        }
    }
}

impl SimpleNameStrategy {
    /// Create the strategy with no transforms configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discriminator attribute name (default `"type"`)
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Strip this prefix from type names before use
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Strip this suffix from type names before use
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strip_suffix = Some(suffix.into());
        self
    }

    /// Decapitalize the first character of the (stripped) name
    pub fn with_decapitalize(mut self, decapitalize: bool) -> Self {
        self.decapitalize = decapitalize;
        self
    }

    fn apply(&self, name: &str) -> String {
        let mut stripped = name;
        if let Some(prefix) = &self.strip_prefix {
            if let Some(rest) = stripped.strip_prefix(prefix.as_str()) {
                stripped = rest;
            }
        }
        if let Some(suffix) = &self.strip_suffix {
            if let Some(rest) = stripped.strip_suffix(suffix.as_str()) {
                stripped = rest;
            }
        }
        if self.decapitalize {
            decapitalize(stripped)
        } else {
            stripped.to_string()
        }
    }
}

/// Lower the first character unless the first two are both uppercase
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return String::new(),
    };
    if let Some(second) = chars.next() {
        if first.is_uppercase() && second.is_uppercase() {
            return name.to_string();
        }
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

impl DiscriminatorStrategy for SimpleNameStrategy {
    fn to_discriminator(
        &self,
        declared: TypeToken,
        runtime: TypeToken,
        candidates: &[TypeToken],
    ) -> Result<Discriminator> {
        if !candidates.contains(&runtime) {
            return Err(ViewLoomError::TypeMismatch {
                expected: format!("a subtype of {}", declared),
                found: runtime.name().to_string(),
            });
        }
        Ok(Discriminator {
            name: self.attribute.clone(),
            value: self.apply(runtime.name()),
        })
    }

    fn to_subtype(
        &self,
        declared: TypeToken,
        value: &str,
        candidates: &[TypeToken],
    ) -> Result<TypeToken> {
        candidates
            .iter()
            .find(|c| self.apply(c.name()) == value)
            .copied()
            .ok_or_else(|| ViewLoomError::DiscriminatorUnresolvable {
                declared: declared.name().to_string(),
                value: value.to_string(),
            })
    }
}
