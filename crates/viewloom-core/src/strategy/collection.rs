use std::sync::Arc;

use viewloom_core_types::{CollectionItem, ModelObject, TypeToken};

use super::chain::Chain;
use crate::errors::{Result, ViewLoomError};

/// Applies positional edits to a model-side collection
///
/// The application engine computes a minimal edit sequence when
/// synchronizing an existing collection against an incoming element list
/// and performs each edit through a manager, so callers can hook
/// collection mutation (ORM-backed lists, observable collections).
pub trait ListManager: Send + Sync {
    /// Check whether this manager handles the owner type / field
    fn supports(&self, owner: TypeToken, field: &str) -> bool;

    /// Insert `item` at `index`
    ///
    /// # Errors
    ///
    /// Returns an error when the owner rejects the edit.
    fn add(
        &self,
        owner: &mut dyn ModelObject,
        field: &str,
        index: usize,
        item: CollectionItem,
    ) -> Result<()>;

    /// Remove the element at `index`
    ///
    /// # Errors
    ///
    /// Returns an error when the owner rejects the edit.
    fn remove(&self, owner: &mut dyn ModelObject, field: &str, index: usize) -> Result<()>;
}

/// Ordered list-manager chain
pub type ListManagers = Chain<dyn ListManager>;

impl Chain<dyn ListManager> {
    /// Select the first manager supporting the owner type / field, falling
    /// back to the accessor-delegating builtin
    pub fn select(&self, owner: TypeToken, field: &str) -> Arc<dyn ListManager> {
        self.iter()
            .find(|m| m.supports(owner, field))
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::new(AccessorListManager))
    }
}

/// Builtin manager delegating edits to the owner's accessor capability
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorListManager;

impl ListManager for AccessorListManager {
    fn supports(&self, _owner: TypeToken, _field: &str) -> bool {
        true
    }

    fn add(
        &self,
        owner: &mut dyn ModelObject,
        field: &str,
        index: usize,
        item: CollectionItem,
    ) -> Result<()> {
        if owner.insert_item(field, index, item) {
            Ok(())
        } else {
            Err(ViewLoomError::AccessorRejected {
                operation: "insert_item".to_string(),
                field: field.to_string(),
                model_type: owner.type_token().name().to_string(),
            })
        }
    }

    fn remove(&self, owner: &mut dyn ModelObject, field: &str, index: usize) -> Result<()> {
        if owner.remove_item(field, index) {
            Ok(())
        } else {
            Err(ViewLoomError::AccessorRejected {
                operation: "remove_item".to_string(),
                field: field.to_string(),
                model_type: owner.type_token().name().to_string(),
            })
        }
    }
}
