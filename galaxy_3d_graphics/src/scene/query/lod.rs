/// Distance culling and LOD group resolution shared by the queries.
///
/// Distances are view-normalized: the camera distance divided by the
/// projection scale, times the camera and context LOD biases, divided by
/// the largest component of the node's world scale (a node scaled up
/// twice behaves as if it were twice as close).

use crate::camera::CameraView;
use crate::error::Result;
use crate::scene::{LodGroupNode, NodeKey, SceneGraph, SceneNode};

/// View-normalized distance of a node to `view`
pub fn lod_distance(graph: &SceneGraph, key: NodeKey, view: &CameraView, lod_bias: f32) -> Result<f32> {
    let scale = graph.scale_world(key)?.abs().max_element();
    if scale <= 0.0 {
        return Ok(f32::INFINITY);
    }
    let position = graph.pose_world(key)?.position;
    Ok(view.view_normalized_distance(position) * lod_bias / scale)
}

/// Whether a node is farther than its own `max_distance` (0 or infinite
/// disables culling)
pub fn is_distance_culled(node: &SceneNode, distance: f32) -> bool {
    let max = node.max_distance();
    max > 0.0 && max.is_finite() && distance >= max
}

/// Walks candidates, replacing LOD groups by their selected level
pub(crate) struct LodResolver<'a> {
    graph: &'a SceneGraph,
    view: Option<&'a CameraView>,
    lod_bias: f32,
}

impl<'a> LodResolver<'a> {
    /// Without a view, nothing is distance culled and LOD groups resolve
    /// to their first level
    pub(crate) fn new(graph: &'a SceneGraph, view: Option<&'a CameraView>, lod_bias: f32) -> Self {
        Self { graph, view, lod_bias }
    }

    fn distance(&self, key: NodeKey) -> Result<Option<f32>> {
        match self.view {
            Some(view) => lod_distance(self.graph, key, view, self.lod_bias).map(Some),
            None => Ok(None),
        }
    }

    /// Append every node accepted by `predicate` and not distance culled
    pub(crate) fn collect<P>(&self, candidates: &[NodeKey], predicate: &mut P, out: &mut Vec<NodeKey>) -> Result<()>
    where
        P: FnMut(&SceneGraph, NodeKey) -> Result<bool>,
    {
        for key in candidates {
            self.add_node(*key, predicate, out)?;
        }
        Ok(())
    }

    fn add_node<P>(&self, key: NodeKey, predicate: &mut P, out: &mut Vec<NodeKey>) -> Result<()>
    where
        P: FnMut(&SceneGraph, NodeKey) -> Result<bool>,
    {
        let node = self.graph.node(key)?;
        let distance = self.distance(key)?;
        if distance.is_some_and(|d| is_distance_culled(node, d)) {
            return Ok(());
        }

        if let Some(lod) = node.data_as::<LodGroupNode>() {
            if let Some(level) = lod.select_level(distance.unwrap_or(0.0)) {
                self.add_subtree(level, predicate, out)?;
            }
            return Ok(());
        }

        if predicate(self.graph, key)? {
            out.push(key);
        }
        Ok(())
    }

    fn add_subtree<P>(&self, key: NodeKey, predicate: &mut P, out: &mut Vec<NodeKey>) -> Result<()>
    where
        P: FnMut(&SceneGraph, NodeKey) -> Result<bool>,
    {
        let node = self.graph.node(key)?;
        if !node.is_enabled() {
            return Ok(());
        }
        self.add_node(key, predicate, out)?;

        // Children of a nested group are its levels, resolved above
        if node.data_as::<LodGroupNode>().is_none() {
            for child in node.children().iter() {
                self.add_subtree(child, predicate, out)?;
            }
        }
        Ok(())
    }
}
