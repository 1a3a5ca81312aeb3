use serde::{Deserialize, Serialize};
use viewloom_core_types::Scalar;

/// Kind of a view event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Value,
    Url,
    Meta,
    Discriminator,
    BeginEnvelope,
    EndEnvelope,
    BeginSplice,
    EndSplice,
}

impl EventKind {
    /// Check whether this kind opens a nested substructure
    pub fn opens(self) -> bool {
        matches!(
            self,
            EventKind::BeginObject
                | EventKind::BeginArray
                | EventKind::BeginEnvelope
                | EventKind::BeginSplice
        )
    }

    /// Check whether this kind closes a nested substructure
    pub fn closes(self) -> bool {
        matches!(
            self,
            EventKind::EndObject
                | EventKind::EndArray
                | EventKind::EndEnvelope
                | EventKind::EndSplice
        )
    }

    /// The matching end kind for a begin kind, and vice versa
    pub fn complement(self) -> Option<EventKind> {
        match self {
            EventKind::BeginObject => Some(EventKind::EndObject),
            EventKind::EndObject => Some(EventKind::BeginObject),
            EventKind::BeginArray => Some(EventKind::EndArray),
            EventKind::EndArray => Some(EventKind::BeginArray),
            EventKind::BeginEnvelope => Some(EventKind::EndEnvelope),
            EventKind::EndEnvelope => Some(EventKind::BeginEnvelope),
            EventKind::BeginSplice => Some(EventKind::EndSplice),
            EventKind::EndSplice => Some(EventKind::BeginSplice),
            _ => None,
        }
    }

    /// Canonical label, as seen by codec implementers
    pub fn label(self) -> &'static str {
        match self {
            EventKind::BeginObject => "BEGIN_OBJECT",
            EventKind::EndObject => "END_OBJECT",
            EventKind::BeginArray => "BEGIN_ARRAY",
            EventKind::EndArray => "END_ARRAY",
            EventKind::Value => "VALUE",
            EventKind::Url => "URL",
            EventKind::Meta => "META",
            EventKind::Discriminator => "DISCRIMINATOR",
            EventKind::BeginEnvelope => "BEGIN_ENVELOPE",
            EventKind::EndEnvelope => "END_ENVELOPE",
            EventKind::BeginSplice => "BEGIN_SPLICE",
            EventKind::EndSplice => "END_SPLICE",
        }
    }
}

/// One structural or value signal in a view
///
/// Every `Begin*` event has exactly one matching `End*` event at the same
/// nesting depth. `VALUE`, `URL`, `META` and `DISCRIMINATOR` events carry a
/// scalar payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub value: Option<Scalar>,
}

impl Event {
    /// Create an unnamed event of the given kind
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            name: None,
            namespace: None,
            value: None,
        }
    }

    /// Create a named event of the given kind
    pub fn named(kind: EventKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            namespace: None,
            value: None,
        }
    }

    /// Attach a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Attach a scalar payload
    pub fn with_value(mut self, value: Scalar) -> Self {
        self.value = Some(value);
        self
    }

    /// A `VALUE` event
    pub fn scalar(name: impl Into<String>, value: Scalar) -> Self {
        Event::named(EventKind::Value, name).with_value(value)
    }

    /// A `URL` event
    pub fn url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Event::named(EventKind::Url, name).with_value(Scalar::Text(url.into()))
    }

    /// A `DISCRIMINATOR` event
    pub fn discriminator(name: impl Into<String>, value: impl Into<String>) -> Self {
        Event::named(EventKind::Discriminator, name).with_value(Scalar::Text(value.into()))
    }

    /// A `META` event (envelope property)
    pub fn meta(name: impl Into<String>, value: Scalar) -> Self {
        Event::named(EventKind::Meta, name).with_value(value)
    }

    /// Check kind, name and namespace against an expectation
    pub fn matches(&self, kind: EventKind, name: Option<&str>, namespace: Option<&str>) -> bool {
        self.kind == kind && self.name.as_deref() == name && self.namespace.as_deref() == namespace
    }

    /// Human-readable description for error context
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("{} '{}'", self.kind.label(), name),
            None => self.kind.label().to_string(),
        }
    }
}
