//! Generation and application engines
//!
//! Both engines walk the same node tree: generation walks the model
//! outward into events, application walks events inward into the model.
//! The lookahead primitives shared by the application engine live in
//! [`lookahead`].

pub mod editor;
pub mod generate;
pub mod lookahead;

pub use editor::ModelEditor;
pub use generate::generate;

use std::sync::Arc;

use viewloom_core_types::Scalar;

use crate::context::ScopedContext;
use crate::errors::{Result, ViewLoomError};
use crate::strategy::ValueConverter;
use crate::template::Node;

/// Convert a model-side scalar into its view representation
///
/// Node-local converter first; otherwise, if the node declares a value
/// type, the first supporting chain member (conversion is then required);
/// otherwise identity.
pub(crate) fn convert_to_view(
    ctx: &ScopedContext,
    node: &Node,
    local: Option<&Arc<dyn ValueConverter>>,
    value: &Scalar,
) -> Result<Scalar> {
    match select_converter(ctx, node, local)? {
        Some(converter) => converter.to_view(value),
        None => Ok(value.clone()),
    }
}

/// Convert a view-side scalar into its model representation
pub(crate) fn convert_to_model(
    ctx: &ScopedContext,
    node: &Node,
    local: Option<&Arc<dyn ValueConverter>>,
    value: &Scalar,
) -> Result<Scalar> {
    match select_converter(ctx, node, local)? {
        Some(converter) => converter.to_model(value),
        None => Ok(value.clone()),
    }
}

fn select_converter(
    ctx: &ScopedContext,
    node: &Node,
    local: Option<&Arc<dyn ValueConverter>>,
) -> Result<Option<Arc<dyn ValueConverter>>> {
    if let Some(converter) = local {
        return Ok(Some(Arc::clone(converter)));
    }
    match node.model_type() {
        Some(value_type) => match ctx.value_converters()?.find(value_type) {
            Some(converter) => Ok(Some(converter)),
            None => Err(ViewLoomError::ConversionUnsupported {
                value_type: value_type.name().to_string(),
                node: node.display_name(),
            }),
        },
        None => Ok(None),
    }
}
