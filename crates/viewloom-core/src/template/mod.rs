//! Template / node tree
//!
//! A [`Template`] is an immutable, composable tree of typed [`Node`]s plus
//! the [`TypeRegistry`] naming every model type it touches. Templates are
//! compiled and validated once, then reused across any number of
//! generation and application calls, including concurrent ones.

mod node;
mod validate;

pub use node::{Node, NodeKind, SubtypeBranch};
pub use validate::validate_tree;

use viewloom_core_types::TypeRegistry;

use crate::errors::Result;

/// Immutable compiled template
#[derive(Debug)]
pub struct Template {
    root: Node,
    types: TypeRegistry,
}

impl Template {
    /// Build a template, validating the node tree
    ///
    /// # Errors
    ///
    /// Returns `TemplateInvalid` naming the offending node when the tree
    /// violates a structural invariant.
    pub fn new(root: Node, types: TypeRegistry) -> Result<Self> {
        validate_tree(&root)?;
        Ok(Self { root, types })
    }

    /// The root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The type registry backing default construction
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }
}
