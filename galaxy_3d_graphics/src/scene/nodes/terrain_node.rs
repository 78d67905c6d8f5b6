/// TerrainNode: a heightfield terrain patch centered on the node.
///
/// Terrain only casts shadows from directional lights; the shadow-caster
/// query skips it for local lights.

use glam::{Vec2, Vec3};
use crate::error::Result;
use crate::engine_bail;
use crate::math::{Shape, AABB};
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone)]
pub struct TerrainNode {
    size: Vec2,
    min_height: f32,
    max_height: f32,
}

impl Default for TerrainNode {
    fn default() -> Self {
        Self { size: Vec2::splat(1.0), min_height: 0.0, max_height: 0.0 }
    }
}

impl TerrainNode {
    /// Patch of `size` (X, Z) with heights in `[min_height, max_height]`
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for a non-positive size or an inverted
    /// height range.
    pub fn new(size: Vec2, min_height: f32, max_height: f32) -> Result<Self> {
        if !(size.is_finite() && size.min_element() > 0.0) {
            engine_bail!(Configuration, "galaxy3d::TerrainNode", "Invalid terrain size {:?}", size);
        }
        if !(min_height <= max_height) {
            engine_bail!(Configuration, "galaxy3d::TerrainNode",
                "Invalid height range [{}, {}]", min_height, max_height);
        }
        Ok(Self { size, min_height, max_height })
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height, self.max_height)
    }
}

impl NodeData for TerrainNode {
    node_data_common!(TerrainNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        *self = downcast_source::<TerrainNode>(source, "TerrainNode")?.clone();
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        let half = self.size * 0.5;
        Some(Shape::Custom(AABB::new(
            Vec3::new(-half.x, self.min_height, -half.y),
            Vec3::new(half.x, self.max_height, half.y),
        )))
    }
}
