use viewloom_core_types::{ModelHandle, TypeToken};

use super::chain::Chain;
use crate::errors::Result;
use crate::view::ViewEntity;

/// Resolves a by-reference association to an existing instance
///
/// Resolvers never build owned objects; they locate instances that already
/// exist elsewhere (a repository, an id map populated earlier in the call).
pub trait ReferenceResolver: Send + Sync {
    /// Check whether this resolver handles the declared reference type
    fn supports(&self, declared: TypeToken) -> bool;

    /// Resolve the entity to an existing instance; `Ok(None)` means the
    /// instance could not be found
    fn resolve(&self, declared: TypeToken, entity: &ViewEntity) -> Result<Option<ModelHandle>>;
}

/// Ordered reference-resolver chain
pub type ReferenceResolvers = Chain<dyn ReferenceResolver>;

impl Chain<dyn ReferenceResolver> {
    /// Invoke the first resolver whose `supports` answers true
    ///
    /// Returns `Ok(None)` when no resolver claims the type or the claiming
    /// resolver finds nothing; the application engine turns that into a
    /// fatal unresolved-reference error.
    pub fn resolve(
        &self,
        declared: TypeToken,
        entity: &ViewEntity,
    ) -> Result<Option<ModelHandle>> {
        for resolver in self.iter() {
            if resolver.supports(declared) {
                return resolver.resolve(declared, entity);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::{Arc, Mutex};
    use viewloom_core_types::{FieldView, ModelObject, Scalar};

    struct Item;

    impl ModelObject for Item {
        fn type_token(&self) -> TypeToken {
            TypeToken::of::<Item>("Item")
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

    struct ItemResolver;

    impl ReferenceResolver for ItemResolver {
        fn supports(&self, declared: TypeToken) -> bool {
            declared.is::<Item>()
        }

        fn resolve(
            &self,
            _declared: TypeToken,
            entity: &ViewEntity,
        ) -> Result<Option<ModelHandle>> {
            if entity.get("id") == Some(&Scalar::Int(1)) {
                Ok(Some(Arc::new(Mutex::new(Item))))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_first_supporting_resolver_is_asked() {
        let mut chain = ReferenceResolvers::new();
        chain.append(Arc::new(ItemResolver));

        let mut entity = ViewEntity::new(TypeToken::of::<Item>("Item"));
        entity.put("id", Scalar::Int(1));
        assert!(chain
            .resolve(TypeToken::of::<Item>("Item"), &entity)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_unclaimed_type_resolves_to_none() {
        struct Unrelated;
        let mut chain = ReferenceResolvers::new();
        chain.append(Arc::new(ItemResolver));

        let entity = ViewEntity::new(TypeToken::of::<Unrelated>("Unrelated"));
        assert!(chain
            .resolve(TypeToken::of::<Unrelated>("Unrelated"), &entity)
            .unwrap()
            .is_none());
    }
}
