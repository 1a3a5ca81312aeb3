use viewloom_core_types::ModelObject;

use crate::context::ScopedContext;
use crate::errors::Result;
use crate::template::Node;
use crate::view::View;

/// External handler for spliced sub-views
///
/// A splice node embeds foreign structured data the engine does not
/// understand. The handler produces the embedded sub-view during
/// generation and consumes it during application; the engine treats the
/// view as opaque substructure between splice boundary markers.
pub trait SpliceHandler: Send + Sync {
    /// Produce the embedded sub-view; `Ok(None)` omits the node entirely
    fn generate(
        &self,
        node: &Node,
        model: &dyn ModelObject,
        ctx: &ScopedContext,
    ) -> Result<Option<View>>;

    /// Consume a reconstructed sub-view to update opaque model state
    fn apply(
        &self,
        node: &Node,
        view: &View,
        model: &mut dyn ModelObject,
        ctx: &ScopedContext,
    ) -> Result<()>;
}
