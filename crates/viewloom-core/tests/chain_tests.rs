use std::any::Any;
use std::sync::Arc;

use viewloom_core::errors::Result;
use viewloom_core::strategy::{ObjectFactories, ObjectFactory};
use viewloom_core::{FieldView, ModelObject, Scalar, TypeRegistry, TypeToken};

#[derive(Default)]
struct Tagged {
    tag: String,
}

fn tagged_token() -> TypeToken {
    TypeToken::of::<Tagged>("Tagged")
}

impl ModelObject for Tagged {
    fn type_token(&self) -> TypeToken {
        tagged_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "tag" => Some(FieldView::Scalar(Scalar::Text(self.tag.clone()))),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Factory stamping every created instance with a fixed tag
struct StampFactory(&'static str);

impl ObjectFactory for StampFactory {
    fn new_instance(&self, token: TypeToken) -> Result<Option<Box<dyn ModelObject>>> {
        if token == tagged_token() {
            Ok(Some(Box::new(Tagged {
                tag: self.0.to_string(),
            })))
        } else {
            Ok(None)
        }
    }
}

/// Factory declaring non-support for every type
struct DeclineFactory;

impl ObjectFactory for DeclineFactory {
    fn new_instance(&self, _token: TypeToken) -> Result<Option<Box<dyn ModelObject>>> {
        Ok(None)
    }
}

fn registry() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register::<Tagged>(tagged_token());
    types
}

fn created_tag(chain: &ObjectFactories) -> String {
    let instance = chain
        .new_instance(tagged_token(), &registry())
        .unwrap()
        .unwrap();
    instance
        .into_any()
        .downcast::<Tagged>()
        .unwrap()
        .tag
}

// ===== ORDERING =====

#[test]
fn test_append_places_after_all_entries() {
    let mut chain = ObjectFactories::new();
    chain.append(Arc::new(StampFactory("a")));
    chain.append(Arc::new(StampFactory("b")));

    assert_eq!(created_tag(&chain), "a");
}

#[test]
fn test_prepend_places_before_all_entries() {
    let mut chain = ObjectFactories::new();
    chain.append(Arc::new(StampFactory("a")));
    chain.prepend(Arc::new(StampFactory("b")));

    assert_eq!(created_tag(&chain), "b");
}

#[test]
fn test_remove_reports_whether_removal_occurred() {
    let first: Arc<dyn ObjectFactory> = Arc::new(StampFactory("a"));
    let second: Arc<dyn ObjectFactory> = Arc::new(StampFactory("b"));

    let mut chain = ObjectFactories::new();
    chain.append(Arc::clone(&first));
    chain.append(Arc::clone(&second));

    assert!(chain.remove(&first));
    assert_eq!(created_tag(&chain), "b");
    assert!(!chain.remove(&first));
}

// ===== FALLBACK =====

#[test]
fn test_empty_chain_falls_back_to_default_construction() {
    let chain = ObjectFactories::new();
    // Tagged::default() has an empty tag
    assert_eq!(created_tag(&chain), "");
}

#[test]
fn test_declining_factories_fall_through_to_default() {
    let mut chain = ObjectFactories::new();
    chain.append(Arc::new(DeclineFactory));
    chain.append(Arc::new(DeclineFactory));

    assert_eq!(created_tag(&chain), "");
}

#[test]
fn test_unknown_type_with_empty_chain_yields_nothing() {
    struct Unknown;
    let chain = ObjectFactories::new();
    let result = chain
        .new_instance(TypeToken::of::<Unknown>("Unknown"), &registry())
        .unwrap();
    assert!(result.is_none());
}
