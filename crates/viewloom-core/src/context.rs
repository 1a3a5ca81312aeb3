//! Per-call scoped context
//!
//! A [`ScopedContext`] is created fresh for every generation or
//! application call and discarded afterwards. It owns the scope stack
//! (global registrations at the bottom, per-call scope above, transient
//! node-local scopes pushed and popped by the engines) and the default
//! strategy chains. Every strategy accessor consults the scope stack
//! first, so node-local registrations shadow call-level and global ones.

use std::sync::Arc;

use crate::errors::Result;
use crate::scope::{Scope, ScopeStack};
use crate::strategy::{
    DiscriminatorStrategy, ListManagers, ObjectFactories, ReferenceResolvers,
    SimpleNameStrategy, SpliceHandler, UrlDecorators, UrlResolver, ValueConverters,
};

/// Context threaded through one generation or application call
pub struct ScopedContext {
    stack: ScopeStack,
    discriminator: Arc<dyn DiscriminatorStrategy>,
    reference_resolvers: ReferenceResolvers,
    object_factories: ObjectFactories,
    value_converters: ValueConverters,
    list_managers: ListManagers,
    url_decorators: UrlDecorators,
}

impl Default for ScopedContext {
    fn default() -> Self {
        Self {
            stack: ScopeStack::new(),
            discriminator: Arc::new(SimpleNameStrategy::new()),
            reference_resolvers: ReferenceResolvers::new(),
            object_factories: ObjectFactories::new(),
            value_converters: ValueConverters::new(),
            list_managers: ListManagers::new(),
            url_decorators: UrlDecorators::new(),
        }
    }
}

impl ScopedContext {
    /// Create a context with empty scopes and default strategies
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a call-level scope already pushed
    pub fn with_scope(scope: Scope) -> Self {
        let mut ctx = Self::new();
        ctx.stack.push(Arc::new(scope));
        ctx
    }

    /// Push a scope; used by the engines for node-local registrations
    pub fn push_scope(&mut self, scope: Arc<Scope>) {
        self.stack.push(scope);
    }

    /// Pop the innermost scope
    pub fn pop_scope(&mut self) {
        self.stack.pop();
    }

    /// The scope stack, for direct lookups
    pub fn scopes(&self) -> &ScopeStack {
        &self.stack
    }

    // ===== Default chain configuration =====

    /// Replace the default discriminator strategy
    pub fn set_discriminator_strategy(&mut self, strategy: Arc<dyn DiscriminatorStrategy>) {
        self.discriminator = strategy;
    }

    pub fn reference_resolvers_mut(&mut self) -> &mut ReferenceResolvers {
        &mut self.reference_resolvers
    }

    pub fn object_factories_mut(&mut self) -> &mut ObjectFactories {
        &mut self.object_factories
    }

    pub fn value_converters_mut(&mut self) -> &mut ValueConverters {
        &mut self.value_converters
    }

    pub fn list_managers_mut(&mut self) -> &mut ListManagers {
        &mut self.list_managers
    }

    pub fn url_decorators_mut(&mut self) -> &mut UrlDecorators {
        &mut self.url_decorators
    }

    // ===== Scope-aware strategy resolution =====

    /// The discriminator strategy in effect (scope override or default)
    pub fn discriminator_strategy(&self) -> Result<Arc<dyn DiscriminatorStrategy>> {
        Ok(self
            .stack
            .get::<dyn DiscriminatorStrategy>()?
            .unwrap_or_else(|| Arc::clone(&self.discriminator)))
    }

    /// The reference-resolver chain in effect
    pub fn reference_resolvers(&self) -> Result<ReferenceResolvers> {
        Ok(match self.stack.get::<ReferenceResolvers>()? {
            Some(chain) => (*chain).clone(),
            None => self.reference_resolvers.clone(),
        })
    }

    /// The object-factory chain in effect
    pub fn object_factories(&self) -> Result<ObjectFactories> {
        Ok(match self.stack.get::<ObjectFactories>()? {
            Some(chain) => (*chain).clone(),
            None => self.object_factories.clone(),
        })
    }

    /// The value-converter chain in effect
    pub fn value_converters(&self) -> Result<ValueConverters> {
        Ok(match self.stack.get::<ValueConverters>()? {
            Some(chain) => (*chain).clone(),
            None => self.value_converters.clone(),
        })
    }

    /// The list-manager chain in effect
    pub fn list_managers(&self) -> Result<ListManagers> {
        Ok(match self.stack.get::<ListManagers>()? {
            Some(chain) => (*chain).clone(),
            None => self.list_managers.clone(),
        })
    }

    /// The URL-decorator chain in effect
    pub fn url_decorators(&self) -> Result<UrlDecorators> {
        Ok(match self.stack.get::<UrlDecorators>()? {
            Some(chain) => (*chain).clone(),
            None => self.url_decorators.clone(),
        })
    }

    /// The scope-supplied URL resolver, if any
    pub fn url_resolver(&self) -> Result<Option<Arc<dyn UrlResolver>>> {
        self.stack.get::<dyn UrlResolver>()
    }

    /// The scope-supplied splice handler, if any
    pub fn splice_handler(&self) -> Result<Option<Arc<dyn SpliceHandler>>> {
        self.stack.get::<dyn SpliceHandler>()
    }
}

impl std::fmt::Debug for ScopedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedContext")
            .field("scope_depth", &self.stack.depth())
            .field("reference_resolvers", &self.reference_resolvers.len())
            .field("object_factories", &self.object_factories.len())
            .field("value_converters", &self.value_converters.len())
            .field("list_managers", &self.list_managers.len())
            .field("url_decorators", &self.url_decorators.len())
            .finish()
    }
}
