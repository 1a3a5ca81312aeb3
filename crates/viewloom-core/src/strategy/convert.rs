use std::sync::Arc;

use viewloom_core_types::{Scalar, TypeToken};

use super::chain::Chain;
use crate::errors::Result;

/// Converts scalars between their model and view representations
///
/// `supports` is asked with the value type declared by the template node
/// (e.g. a timestamp token whose view form is an ISO-8601 string).
pub trait ValueConverter: Send + Sync {
    /// Check whether this converter handles the declared value type
    fn supports(&self, value_type: TypeToken) -> bool;

    /// Convert a model-side scalar into its view representation
    fn to_view(&self, value: &Scalar) -> Result<Scalar>;

    /// Convert a view-side scalar into its model representation
    fn to_model(&self, value: &Scalar) -> Result<Scalar>;
}

/// Ordered value-converter chain
pub type ValueConverters = Chain<dyn ValueConverter>;

impl Chain<dyn ValueConverter> {
    /// Find the first converter supporting the declared value type
    pub fn find(&self, value_type: TypeToken) -> Option<Arc<dyn ValueConverter>> {
        self.iter()
            .find(|c| c.supports(value_type))
            .map(Arc::clone)
    }
}
