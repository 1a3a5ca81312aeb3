use super::chain::Chain;
use crate::context::ScopedContext;
use crate::errors::Result;
use crate::template::Node;

/// External URL-resolution capability
///
/// Supplied through the scope mechanism (typically by a framework adapter
/// that knows about routes). Must be safe under concurrent calls from
/// independent generations.
pub trait UrlResolver: Send + Sync {
    /// Resolve the URL for a url node
    fn resolve(&self, node: &Node, ctx: &ScopedContext) -> Result<String>;
}

/// Rewrites a resolved URL; each decorator is free to replace it entirely
pub trait UrlDecorator: Send + Sync {
    fn decorate(&self, url: String, node: &Node, ctx: &ScopedContext) -> String;
}

/// Ordered URL-decorator chain
pub type UrlDecorators = Chain<dyn UrlDecorator>;

impl Chain<dyn UrlDecorator> {
    /// Apply all decorators in registration order
    pub fn apply(&self, url: String, node: &Node, ctx: &ScopedContext) -> String {
        self.iter()
            .fold(url, |acc, d| d.decorate(acc, node, ctx))
    }
}
