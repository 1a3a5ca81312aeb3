use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::token::TypeToken;
use crate::value::Scalar;

/// Shared handle to a model object, as used for by-reference associations
///
/// A reference field does not own its referent; the same instance may be
/// reachable from many places in a model graph, and reference resolvers
/// (which are shared across concurrent calls) hold such handles in their
/// lookup state.
pub type ModelHandle = Arc<Mutex<dyn ModelObject>>;

/// Check whether two handles point at the same instance
pub fn same_instance(a: &ModelHandle, b: &ModelHandle) -> bool {
    Arc::ptr_eq(a, b)
}

/// Read-side projection of a single model field
///
/// Returned by [`ModelObject::field`]. `Absent` means the field exists but
/// currently holds no value (the generation engine omits the subtree);
/// a `None` return from `field` means the field is unknown to the type,
/// which is a template/model mismatch.
pub enum FieldView<'a> {
    /// Field exists but holds no value
    Absent,
    Scalar(Scalar),
    /// Owned child object
    Object(&'a dyn ModelObject),
    /// By-reference association
    Handle(ModelHandle),
    /// Owned object collection, in model order
    Objects(Vec<&'a dyn ModelObject>),
    /// By-reference collection, in model order
    Handles(Vec<ModelHandle>),
    /// Scalar collection, in model order
    Scalars(Vec<Scalar>),
}

/// One element handed to a collection manager's `add`
pub enum CollectionItem {
    Object(Box<dyn ModelObject>),
    Handle(ModelHandle),
}

/// Accessor capability over a user model type
///
/// The engine never reflects over model types; every read and write goes
/// through this trait, with field names resolved and validated when the
/// template is built. Write methods return `false` when the field is
/// unknown or the supplied value has the wrong shape; the engine turns
/// that into a typed error carrying the field and node context.
///
/// The write methods default to rejecting, so read-only models (generation
/// sources) only implement `type_token`, `field` and the downcast hooks.
///
/// Model objects are `Send` so that graphs (and the handles into them) can
/// be built on one thread and consumed on another; a single generation or
/// application call never touches a graph from more than one thread.
pub trait ModelObject: Any + Send {
    /// Runtime type of this object
    fn type_token(&self) -> TypeToken;

    /// Read a field; `None` means the field is unknown to this type
    fn field(&self, name: &str) -> Option<FieldView<'_>>;

    /// Write a scalar field
    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        let _ = (name, value);
        false
    }

    /// Write an owned child object field
    fn set_object(&mut self, name: &str, value: Box<dyn ModelObject>) -> bool {
        let _ = (name, value);
        false
    }

    /// Write a by-reference field
    fn set_reference(&mut self, name: &str, value: ModelHandle) -> bool {
        let _ = (name, value);
        false
    }

    /// Replace a scalar collection wholesale
    fn set_scalars(&mut self, name: &str, values: Vec<Scalar>) -> bool {
        let _ = (name, values);
        false
    }

    /// Mutable access to an owned child object, if present
    fn object_mut(&mut self, name: &str) -> Option<&mut dyn ModelObject> {
        let _ = name;
        None
    }

    /// Mutable access to the owned collection element at `index`
    fn item_mut(&mut self, name: &str, index: usize) -> Option<&mut dyn ModelObject> {
        let _ = (name, index);
        None
    }

    /// Insert a collection element at `index`
    fn insert_item(&mut self, name: &str, index: usize, item: CollectionItem) -> bool {
        let _ = (name, index, item);
        false
    }

    /// Remove the collection element at `index`
    fn remove_item(&mut self, name: &str, index: usize) -> bool {
        let _ = (name, index);
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}
