use viewloom_core_types::{ModelObject, TypeRegistry, TypeToken};

use super::chain::Chain;
use crate::errors::Result;

/// Creates model instances during application in create mode
///
/// A factory declares non-support for a type by returning `Ok(None)`
/// rather than failing; errors are reserved for genuine construction
/// failures of a supported type.
pub trait ObjectFactory: Send + Sync {
    /// Create an instance of the given type, or `Ok(None)` if this factory
    /// does not handle it
    fn new_instance(&self, token: TypeToken) -> Result<Option<Box<dyn ModelObject>>>;
}

/// Ordered object-factory chain
pub type ObjectFactories = Chain<dyn ObjectFactory>;

impl Chain<dyn ObjectFactory> {
    /// Try each factory in order; fall back to the registry's default
    /// no-argument construction after the chain is exhausted
    pub fn new_instance(
        &self,
        token: TypeToken,
        registry: &TypeRegistry,
    ) -> Result<Option<Box<dyn ModelObject>>> {
        for factory in self.iter() {
            if let Some(instance) = factory.new_instance(token)? {
                return Ok(Some(instance));
            }
        }
        Ok(registry.instantiate(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::Arc;
    use viewloom_core_types::FieldView;

    #[derive(Default)]
    struct Gadget {
        preset: bool,
    }

    impl ModelObject for Gadget {
        fn type_token(&self) -> TypeToken {
            TypeToken::of::<Gadget>("Gadget")
        }

        fn field(&self, _name: &str) -> Option<FieldView<'_>> {
            None
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

    struct PresetFactory;

    impl ObjectFactory for PresetFactory {
        fn new_instance(&self, token: TypeToken) -> Result<Option<Box<dyn ModelObject>>> {
            if token.is::<Gadget>() {
                Ok(Some(Box::new(Gadget { preset: true })))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_factory_wins_over_default_construction() {
        let token = TypeToken::of::<Gadget>("Gadget");
        let mut registry = TypeRegistry::new();
        registry.register::<Gadget>(token);

        let mut chain = ObjectFactories::new();
        chain.append(Arc::new(PresetFactory));

        let instance = chain.new_instance(token, &registry).unwrap().unwrap();
        let gadget = instance.into_any().downcast::<Gadget>().unwrap();
        assert!(gadget.preset);
    }

    #[test]
    fn test_empty_chain_falls_back_to_default_construction() {
        let token = TypeToken::of::<Gadget>("Gadget");
        let mut registry = TypeRegistry::new();
        registry.register::<Gadget>(token);

        let chain = ObjectFactories::new();
        let instance = chain.new_instance(token, &registry).unwrap().unwrap();
        let gadget = instance.into_any().downcast::<Gadget>().unwrap();
        assert!(!gadget.preset);
    }

    #[test]
    fn test_unknown_type_yields_none() {
        struct Unknown;
        let chain = ObjectFactories::new();
        let registry = TypeRegistry::new();
        assert!(chain
            .new_instance(TypeToken::of::<Unknown>("Unknown"), &registry)
            .unwrap()
            .is_none());
    }
}
