//! Balanced lookahead over materialized event sequences
//!
//! The application engine needs to look ahead through a queue of events
//! without consuming them, skipping whole balanced substructures: most
//! prominently to locate a container's discriminator among its direct
//! children. All such walks go through the primitives here, which track
//! nesting with an explicit depth counter over complement pairs.

use std::collections::VecDeque;

use crate::view::{Event, EventKind};

/// Find the first event of `target` kind among the direct children of the
/// container whose begin event was just consumed
///
/// `events` must start at the container's first child. Nested balanced
/// substructures are skipped whole; the search stops without a match when
/// the container's own end event is reached (or the sequence runs out).
pub fn find_at_depth<'a, I>(events: I, target: EventKind) -> Option<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut depth: usize = 0;
    for event in events {
        if depth == 0 && event.kind == target {
            return Some(event);
        }
        if event.kind.opens() {
            depth += 1;
        } else if event.kind.closes() {
            if depth == 0 {
                // The container's own end: the search space is exhausted.
                return None;
            }
            depth -= 1;
        }
    }
    None
}

/// Pop events up to (and including) the end event matching an already
/// consumed begin of `open` kind, returning the inner events
///
/// Nested substructures, including nested containers of the same kind,
/// are counted via the depth counter. Returns `None` when the queue runs
/// out before the matching end.
pub fn take_until_complement(
    queue: &mut VecDeque<Event>,
    open: EventKind,
) -> Option<Vec<Event>> {
    let close = open.complement()?;
    let mut inner = Vec::new();
    let mut depth: usize = 0;
    while let Some(event) = queue.pop_front() {
        if event.kind == close && depth == 0 {
            return Some(inner);
        }
        if event.kind.opens() {
            depth += 1;
        } else if event.kind.closes() {
            // Unbalanced close for some other container; callers validate
            // the surrounding structure, so just count it down.
            depth = depth.saturating_sub(1);
        }
        inner.push(event);
    }
    None
}
