//! Core types shared across ViewLoom facilities
//!
//! This crate provides the foundational types used by the mapping engine
//! and by user model code:
//!
//! - **Scalar**: the format-neutral scalar value carried by view events
//! - **TypeToken / TypeRegistry**: stable runtime type identity and the
//!   explicit type registry with default constructors
//! - **Accessor capability**: the `ModelObject` trait and its companions
//!   (`FieldView`, `ModelHandle`, `CollectionItem`) through which the
//!   engine reads and writes user model graphs

pub mod access;
pub mod registry;
pub mod token;
pub mod value;

pub use access::{same_instance, CollectionItem, FieldView, ModelHandle, ModelObject};
pub use registry::TypeRegistry;
pub use token::TypeToken;
pub use value::Scalar;
