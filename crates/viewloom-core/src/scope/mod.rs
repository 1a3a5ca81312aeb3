//! Scope-based lookup
//!
//! A [`Scope`] is an ordered, heterogeneous lookup registry indexed by
//! service type or by name. A [`ScopeStack`] composes scopes so that
//! nested/local registrations shadow outer ones. The engines resolve every
//! strategy through this mechanism, which is what makes node-local
//! overrides possible.

mod registry;
mod stack;

pub use registry::Scope;
pub use stack::ScopeStack;
