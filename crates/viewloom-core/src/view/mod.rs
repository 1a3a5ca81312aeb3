//! Canonical view representation
//!
//! A [`View`] is the format-neutral output of generation and input of
//! application: an ordered, finite, replayable sequence of [`Event`]s plus
//! an [`Envelope`] of named properties. Views are immutable once produced
//! and may be iterated any number of times.

mod entity;
mod envelope;
mod event;

pub use entity::ViewEntity;
pub use envelope::Envelope;
pub use event::{Event, EventKind};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ViewLoomError};

/// Ordered, replayable sequence of events plus an envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct View {
    events: Vec<Event>,
    envelope: Envelope,
}

impl View {
    /// Create a view from an event sequence with an empty envelope
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            envelope: Envelope::new(),
        }
    }

    /// Create a view with an envelope
    pub fn with_envelope(events: Vec<Event>, envelope: Envelope) -> Self {
        Self { events, envelope }
    }

    /// The event sequence, in order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The envelope properties
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Iterate events; views are replayable, so this may be called many times
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check whether the view carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Seal the sequence under a synthetic outer object boundary
    pub fn seal_object(self, name: impl Into<String>) -> View {
        self.seal(EventKind::BeginObject, EventKind::EndObject, name)
    }

    /// Seal the sequence under a synthetic outer array boundary
    pub fn seal_array(self, name: impl Into<String>) -> View {
        self.seal(EventKind::BeginArray, EventKind::EndArray, name)
    }

    fn seal(self, begin: EventKind, end: EventKind, name: impl Into<String>) -> View {
        let name = name.into();
        let mut events = Vec::with_capacity(self.events.len() + 2);
        events.push(Event::named(begin, name.clone()));
        events.extend(self.events);
        events.push(Event::named(end, name));
        View {
            events,
            envelope: self.envelope,
        }
    }

    /// Structural well-formedness check
    ///
    /// Verifies that every `Begin*` event has exactly one matching `End*`
    /// at the same nesting depth and that no `End*` closes a boundary that
    /// was never opened.
    ///
    /// # Errors
    ///
    /// Returns `StructuralMismatch` naming the offending event.
    pub fn check_balanced(&self) -> Result<()> {
        let mut open: Vec<&Event> = Vec::new();
        for event in &self.events {
            if event.kind.opens() {
                open.push(event);
            } else if event.kind.closes() {
                match open.pop() {
                    Some(begin)
                        if begin.kind.complement() == Some(event.kind)
                            && begin.name == event.name =>
                    {
                        // Balanced pair
                    }
                    Some(begin) => {
                        return Err(ViewLoomError::StructuralMismatch {
                            node: "<view>".to_string(),
                            expected: begin
                                .kind
                                .complement()
                                .map(|k| {
                                    Event {
                                        kind: k,
                                        name: begin.name.clone(),
                                        namespace: None,
                                        value: None,
                                    }
                                    .describe()
                                })
                                .unwrap_or_default(),
                            found: event.describe(),
                        });
                    }
                    None => {
                        return Err(ViewLoomError::StructuralMismatch {
                            node: "<view>".to_string(),
                            expected: "an open boundary".to_string(),
                            found: event.describe(),
                        });
                    }
                }
            }
        }
        if let Some(begin) = open.pop() {
            return Err(ViewLoomError::StructuralMismatch {
                node: "<view>".to_string(),
                expected: begin
                    .kind
                    .complement()
                    .map(|k| k.label().to_string())
                    .unwrap_or_default(),
                found: "end of view".to_string(),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewloom_core_types::Scalar;

    #[test]
    fn test_seal_object() {
        let view = View::new(vec![Event::scalar("name", Scalar::from("x"))]);
        let sealed = view.seal_object("person");

        assert_eq!(sealed.len(), 3);
        assert!(sealed.events()[0].matches(EventKind::BeginObject, Some("person"), None));
        assert!(sealed.events()[2].matches(EventKind::EndObject, Some("person"), None));
        assert!(sealed.check_balanced().is_ok());
    }

    #[test]
    fn test_balanced_check_accepts_nesting() {
        let view = View::new(vec![
            Event::named(EventKind::BeginObject, "a"),
            Event::named(EventKind::BeginArray, "items"),
            Event::named(EventKind::BeginObject, "b"),
            Event::named(EventKind::EndObject, "b"),
            Event::named(EventKind::EndArray, "items"),
            Event::named(EventKind::EndObject, "a"),
        ]);
        assert!(view.check_balanced().is_ok());
    }

    #[test]
    fn test_balanced_check_rejects_mismatched_end() {
        let view = View::new(vec![
            Event::named(EventKind::BeginObject, "a"),
            Event::named(EventKind::EndArray, "a"),
        ]);
        assert!(matches!(
            view.check_balanced(),
            Err(ViewLoomError::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn test_balanced_check_rejects_unclosed_begin() {
        let view = View::new(vec![Event::named(EventKind::BeginObject, "a")]);
        assert!(view.check_balanced().is_err());
    }

    #[test]
    fn test_replayable_iteration() {
        let view = View::new(vec![Event::scalar("n", Scalar::Int(1))]);
        assert_eq!(view.iter().count(), 1);
        assert_eq!(view.iter().count(), 1);
    }

    #[test]
    fn test_view_serializes_for_diagnostics() {
        let mut envelope = Envelope::new();
        envelope.put("rev", Scalar::Int(3));
        let view = View::with_envelope(vec![Event::scalar("n", Scalar::Int(1))], envelope);

        let json = serde_json::to_string(&view).unwrap();
        let back: View = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
