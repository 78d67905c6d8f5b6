/// ShadowCasterQuery: nodes casting shadows for a light.
///
/// A node is a caster when it has `CASTS_SHADOWS` and its bounds overlap
/// the light bounds (directional lights overlap everything). For a
/// directional light, nodes an occlusion pass marked
/// `SHADOW_CASTER_CULLED` are skipped. Terrain only casts shadows from
/// directional lights.
///
/// With a LOD camera in the render context, nodes are distance culled and
/// LOD groups resolve to their selected level, the way the camera sees
/// them; shadows then match the geometry actually drawn.

use crate::error::Result;
use crate::math::AABB;
use crate::render::RenderContext;
use crate::scene::{LightNode, NodeKey, SceneGraph, TerrainNode};
use super::lod::LodResolver;
use super::SceneQuery;

#[derive(Debug, Default)]
pub struct ShadowCasterQuery {
    reference: Option<NodeKey>,
    casters: Vec<NodeKey>,
}

impl ShadowCasterQuery {
    pub fn casters(&self) -> &[NodeKey] {
        &self.casters
    }

    pub fn len(&self) -> usize {
        self.casters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.casters.contains(&key)
    }
}

fn is_directional_light(graph: &SceneGraph, key: NodeKey) -> Result<Option<bool>> {
    Ok(graph.node(key)?.data_as::<LightNode>().map(LightNode::is_directional))
}

fn overlaps(graph: &SceneGraph, key: NodeKey, bounds: &AABB) -> Result<bool> {
    let shape = graph.node(key)?.shape();
    if shape.is_empty() {
        return Ok(false);
    }
    if shape.is_infinite() || bounds.is_infinite() {
        return Ok(true);
    }
    Ok(graph.aabb(key)?.intersects(bounds))
}

impl SceneQuery for ShadowCasterQuery {
    fn reference_node(&self) -> Option<NodeKey> {
        self.reference
    }

    fn reset(&mut self) {
        self.reference = None;
        self.casters.clear();
    }

    fn set(
        &mut self,
        reference: NodeKey,
        candidates: &[NodeKey],
        graph: &SceneGraph,
        context: &RenderContext,
    ) -> Result<()> {
        self.reset();
        self.reference = Some(reference);

        // Fall back to the context reference when the node is not a light
        let directional = match is_directional_light(graph, reference)? {
            Some(directional) => directional,
            None => match context.reference_node {
                Some(ambient) if graph.contains(ambient) => {
                    is_directional_light(graph, ambient)?.unwrap_or(false)
                }
                _ => false,
            },
        };
        let light_bounds = graph.aabb(reference)?;

        let mut predicate = |graph: &SceneGraph, key: NodeKey| -> Result<bool> {
            let node = graph.node(key)?;
            if !node.casts_shadows() {
                return Ok(false);
            }
            if directional {
                if node.is_shadow_caster_culled() {
                    return Ok(false);
                }
            } else if node.data_as::<TerrainNode>().is_some() {
                return Ok(false);
            }
            overlaps(graph, key, &light_bounds)
        };

        let resolver = LodResolver::new(graph, context.lod_camera(), context.lod_bias);
        resolver.collect(candidates, &mut predicate, &mut self.casters)
    }
}
