use std::sync::Arc;

use super::registry::Scope;
use crate::errors::Result;

/// Stack of scopes, innermost last
///
/// Lookups walk from the innermost scope outward and stop at the first
/// scope that yields a match. Ambiguity is only ever detected within a
/// single scope; an unambiguous inner match shadows any number of outer
/// registrations.
#[derive(Default, Debug)]
pub struct ScopeStack {
    scopes: Vec<Arc<Scope>>,
}

impl ScopeStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a scope; it becomes the innermost
    pub fn push(&mut self, scope: Arc<Scope>) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope
    pub fn pop(&mut self) -> Option<Arc<Scope>> {
        self.scopes.pop()
    }

    /// Number of scopes on the stack
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up by service type, innermost scope first
    ///
    /// # Errors
    ///
    /// Propagates `AmbiguousScopeLookup` from the first scope that holds
    /// more than one matching entry.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        for scope in self.scopes.iter().rev() {
            if let Some(found) = scope.get::<T>()? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Look up by name, innermost scope first
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from the first scope holding the name
    /// under a different service type.
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>> {
        for scope in self.scopes.iter().rev() {
            if let Some(found) = scope.get_named::<T>(name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut outer = Scope::new();
        outer.bind::<String>(Arc::new("outer".to_string()));
        let mut inner = Scope::new();
        inner.bind::<String>(Arc::new("inner".to_string()));

        let mut stack = ScopeStack::new();
        stack.push(Arc::new(outer));
        stack.push(Arc::new(inner));

        let found = stack.get::<String>().unwrap().unwrap();
        assert_eq!(*found, "inner");
    }

    #[test]
    fn test_lookup_falls_through_to_outer() {
        let mut outer = Scope::new();
        outer.bind::<String>(Arc::new("outer".to_string()));

        let mut stack = ScopeStack::new();
        stack.push(Arc::new(outer));
        stack.push(Arc::new(Scope::new()));

        let found = stack.get::<String>().unwrap().unwrap();
        assert_eq!(*found, "outer");
    }

    #[test]
    fn test_ambiguity_is_per_scope() {
        // The inner scope is ambiguous even though the outer one holds a
        // single unambiguous entry: the inner scope decides.
        let mut outer = Scope::new();
        outer.bind::<String>(Arc::new("outer".to_string()));
        let mut inner = Scope::new();
        inner.bind::<String>(Arc::new("a".to_string()));
        inner.bind::<String>(Arc::new("b".to_string()));

        let mut stack = ScopeStack::new();
        stack.push(Arc::new(outer));
        stack.push(Arc::new(inner));

        assert!(stack.get::<String>().is_err());
    }

    #[test]
    fn test_push_pop() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(Arc::new(Scope::new()));
        assert_eq!(stack.depth(), 1);
        assert!(stack.pop().is_some());
        assert!(stack.pop().is_none());
    }
}
