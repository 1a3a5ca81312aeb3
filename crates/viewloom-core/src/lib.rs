//! ViewLoom Core - template-driven model/view mapping engine
//!
//! This crate maps between in-memory object graphs and a format-neutral,
//! ordered view event stream, driven by an immutable, reusable template:
//! - Template/node tree (value, url, object, arrays, reference, envelope,
//!   subtype, splice) compiled and validated once
//! - Canonical event/view representation honored by all codecs
//! - Generation engine: model graph -> view
//! - Application engine (model editor): view -> created or mutated model
//!   graph, with discriminator lookahead, reference resolution and
//!   identity-preserving collection synchronization
//! - Pluggable strategy families resolved through scope-based lookup
//!
//! Concrete text-format codecs and framework adapters live outside this
//! crate; they only need to honor the event/view contract.

pub mod context;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod scope;
pub mod strategy;
pub mod template;
pub mod view;

// Re-export commonly used types
pub use viewloom_core_types::{
    same_instance, CollectionItem, FieldView, ModelHandle, ModelObject, Scalar, TypeRegistry,
    TypeToken,
};

pub use context::ScopedContext;
pub use engine::{generate, ModelEditor};
pub use errors::{Result, ViewLoomError};
pub use scope::{Scope, ScopeStack};
pub use template::{Node, NodeKind, SubtypeBranch, Template};
pub use view::{Envelope, Event, EventKind, View, ViewEntity};
