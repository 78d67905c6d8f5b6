/// SceneQuery trait: reusable query result containers.

use std::any::Any;
use crate::error::Result;
use crate::render::RenderContext;
use crate::scene::{NodeKey, SceneGraph};

pub trait SceneQuery: Any + Send {
    /// Reference node of the last evaluation (`None` after `reset`)
    fn reference_node(&self) -> Option<NodeKey>;

    /// Clear the result and forget the reference node, keeping allocations
    fn reset(&mut self);

    /// Evaluate the query for `reference` over `candidates`
    ///
    /// `candidates` are enabled nodes that are not represented by a proxy;
    /// implementations resolve LOD groups themselves.
    fn set(
        &mut self,
        reference: NodeKey,
        candidates: &[NodeKey],
        graph: &SceneGraph,
        context: &RenderContext,
    ) -> Result<()>;
}
