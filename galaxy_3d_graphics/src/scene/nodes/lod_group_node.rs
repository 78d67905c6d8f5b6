/// LodGroupNode: distance-based level of detail.
///
/// Each level is a child node of the group, active from a
/// view-normalized distance on. Level nodes use the group as their proxy:
/// scene queries never see them directly, they see the group and resolve
/// it to the level selected for the current distance.
///
/// The group shape is the union of the level bounds in group space. It
/// goes stale when anything below the group changes and is rebuilt by
/// `SceneGraph::refresh_lod_bounds` (which `Scene::begin_frame` calls for
/// every stale group).

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use crate::math::{Shape, AABB};
use crate::scene::{
    CloneContext, NodeData, NodeKey, SceneChangedEvent, SceneChanges, SceneGraph,
};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    /// View-normalized distance from which the level is used
    pub distance: f32,
    pub node: NodeKey,
}

#[derive(Debug, Clone, Default)]
pub struct LodGroupNode {
    levels: Vec<LodLevel>,
    bounds_stale: bool,
}

impl LodGroupNode {
    /// Levels sorted by ascending distance
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_bounds_stale(&self) -> bool {
        self.bounds_stale
    }

    /// Level to use at `distance`: the farthest level whose distance is
    /// reached, or the first level when none is
    pub fn select_level(&self, distance: f32) -> Option<NodeKey> {
        self.levels
            .iter()
            .rev()
            .find(|level| level.distance <= distance)
            .or_else(|| self.levels.first())
            .map(|level| level.node)
    }

    fn insert_level(&mut self, level: LodLevel) {
        let index = self.levels.partition_point(|l| l.distance <= level.distance);
        self.levels.insert(index, level);
    }
}

impl NodeData for LodGroupNode {
    node_data_common!(LodGroupNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<LodGroupNode>(source, "LodGroupNode")?;
        self.levels = source.levels.clone();
        self.bounds_stale = true;
        Ok(())
    }

    fn on_scene_changed(&mut self, event: &SceneChangedEvent) {
        let relevant = SceneChanges::POSE_CHANGED
            | SceneChanges::SHAPE_CHANGED
            | SceneChanges::NODE_ADDED
            | SceneChanges::NODE_REMOVED;
        if event.changes.intersects(relevant) {
            self.bounds_stale = true;
        }
    }

    fn remap_node_keys(&mut self, map: &FxHashMap<NodeKey, NodeKey>) {
        for level in &mut self.levels {
            if let Some(clone) = map.get(&level.node) {
                level.node = *clone;
            }
        }
    }
}

impl SceneGraph {
    /// Attach `node` to `group` as a LOD level used from `distance` on
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for a negative or non-finite distance,
    /// `Error::InvariantViolation` if `group` is not a LOD group or `node`
    /// already has a parent.
    pub fn add_lod_level(&mut self, group: NodeKey, node: NodeKey, distance: f32) -> Result<()> {
        if !(distance >= 0.0 && distance.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::SceneGraph",
                "LOD distance must be >= 0 and finite (got {})", distance);
        }
        self.data::<LodGroupNode>(group)?;

        self.add_child(group, node)?;
        self.set_proxy(node, Some(group))?;
        self.data_mut::<LodGroupNode>(group)?.insert_level(LodLevel { distance, node });
        self.refresh_lod_bounds(group)
    }

    /// Detach a LOD level from its group. Returns false if `node` is not
    /// a level of `group`.
    pub fn remove_lod_level(&mut self, group: NodeKey, node: NodeKey) -> Result<bool> {
        let lod = self.data_mut::<LodGroupNode>(group)?;
        let Some(index) = lod.levels.iter().position(|l| l.node == node) else {
            return Ok(false);
        };
        lod.levels.remove(index);

        self.remove_child(group, node)?;
        self.set_proxy(node, None)?;
        self.refresh_lod_bounds(group)?;
        Ok(true)
    }

    /// Rebuild the group shape from the bounds of its levels
    pub fn refresh_lod_bounds(&mut self, group: NodeKey) -> Result<()> {
        let levels: Vec<NodeKey> = self.data::<LodGroupNode>(group)?.levels.iter().map(|l| l.node).collect();

        let mut infinite = false;
        let mut bounds: Option<AABB> = None;
        for level in levels {
            let node = self.node(level)?;
            let shape = node.shape();
            if shape.is_infinite() {
                infinite = true;
                break;
            }
            if shape.is_empty() {
                continue;
            }
            let local = shape.aabb(node.scale_local(), &node.pose_local());
            bounds = Some(bounds.map_or(local, |b| b.merged(&local)));
        }

        let shape = if infinite {
            Shape::Infinite
        } else {
            bounds.map_or(Shape::Empty, Shape::Custom)
        };
        self.set_shape(group, shape)?;
        self.data_mut::<LodGroupNode>(group)?.bounds_stale = false;
        engine_trace!("galaxy3d::SceneGraph", "LOD group {:?} bounds {:?}", group, shape);
        Ok(())
    }
}
