use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::access::ModelObject;
use crate::token::TypeToken;

type Constructor = Arc<dyn Fn() -> Box<dyn ModelObject> + Send + Sync>;

/// Runtime type registry
///
/// Maps stable type identifiers to their registered default constructors.
/// The registry is built once alongside the template and consulted by the
/// application engine as the builtin fallback after the object-factory
/// chain is exhausted. Types that are only ever resolved by reference may
/// be registered without a constructor.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<TypeToken, Option<Constructor>>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` with its `Default` constructor under the given token
    ///
    /// The token must have been created for `T` (`TypeToken::of::<T>(..)`).
    pub fn register<T: ModelObject + Default>(&mut self, token: TypeToken) {
        debug_assert!(token.is::<T>(), "token does not identify the registered type");
        self.entries
            .insert(token, Some(Arc::new(|| Box::new(T::default()))));
    }

    /// Register a token with an explicit constructor
    pub fn register_with<F>(&mut self, token: TypeToken, ctor: F)
    where
        F: Fn() -> Box<dyn ModelObject> + Send + Sync + 'static,
    {
        self.entries.insert(token, Some(Arc::new(ctor)));
    }

    /// Register a token without a constructor (reference-only type)
    pub fn register_opaque(&mut self, token: TypeToken) {
        self.entries.entry(token).or_insert(None);
    }

    /// Check whether a token is known to the registry
    pub fn contains(&self, token: TypeToken) -> bool {
        self.entries.contains_key(&token)
    }

    /// Default-construct an instance of the given type, if a constructor
    /// was registered for it
    pub fn instantiate(&self, token: TypeToken) -> Option<Box<dyn ModelObject>> {
        self.entries.get(&token).and_then(|ctor| {
            ctor.as_ref().map(|c| c())
        })
    }

    /// Look a token up by its registered simple name
    pub fn token_for_name(&self, name: &str) -> Option<TypeToken> {
        self.entries.keys().find(|t| t.name() == name).copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(|t| t.name()).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
