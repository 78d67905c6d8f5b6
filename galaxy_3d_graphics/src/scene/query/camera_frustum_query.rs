/// CameraFrustumQuery: renderable nodes inside a camera frustum.
///
/// LOD selection and distance culling use the LOD camera of the render
/// context when one is set, the queried camera otherwise.

use crate::error::Result;
use crate::math::Frustum;
use crate::render::RenderContext;
use crate::scene::{NodeKey, SceneGraph};
use super::lod::LodResolver;
use super::SceneQuery;

#[derive(Debug, Default)]
pub struct CameraFrustumQuery {
    reference: Option<NodeKey>,
    visible: Vec<NodeKey>,
}

impl CameraFrustumQuery {
    pub fn visible(&self) -> &[NodeKey] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.visible.contains(&key)
    }
}

impl SceneQuery for CameraFrustumQuery {
    fn reference_node(&self) -> Option<NodeKey> {
        self.reference
    }

    fn reset(&mut self) {
        self.reference = None;
        self.visible.clear();
    }

    /// # Errors
    ///
    /// `Error::Configuration` if `reference` is not a camera node.
    fn set(
        &mut self,
        reference: NodeKey,
        candidates: &[NodeKey],
        graph: &SceneGraph,
        context: &RenderContext,
    ) -> Result<()> {
        self.reset();
        let view = graph.camera_view(reference)?;
        self.reference = Some(reference);
        let frustum = Frustum::from_view_projection(&view.view_projection());

        let mut predicate = |graph: &SceneGraph, key: NodeKey| -> Result<bool> {
            let node = graph.node(key)?;
            if !node.is_renderable() || node.shape().is_empty() {
                return Ok(false);
            }
            Ok(frustum.intersects_aabb(&graph.aabb(key)?))
        };

        let lod_view = context.lod_camera().unwrap_or(&view);
        let resolver = LodResolver::new(graph, Some(lod_view), context.lod_bias);
        resolver.collect(candidates, &mut predicate, &mut self.visible)
    }
}
