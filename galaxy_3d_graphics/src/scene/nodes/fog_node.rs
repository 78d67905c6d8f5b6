/// FogNode: global height fog.
///
/// Fog has no bounds; it always takes part in queries.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone)]
pub struct FogNode {
    color: Vec3,
    density: f32,
    height_falloff: f32,
}

impl Default for FogNode {
    fn default() -> Self {
        Self { color: Vec3::splat(0.5), density: 0.01, height_falloff: 0.0 }
    }
}

impl FogNode {
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a negative density.
    pub fn set_density(&mut self, density: f32) -> Result<()> {
        if !(density >= 0.0 && density.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::FogNode", "density must be >= 0 (got {})", density);
        }
        self.density = density;
        Ok(())
    }

    /// Exponential density decrease per unit of height above the node
    pub fn height_falloff(&self) -> f32 {
        self.height_falloff
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a negative falloff.
    pub fn set_height_falloff(&mut self, falloff: f32) -> Result<()> {
        if !(falloff >= 0.0 && falloff.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::FogNode", "height_falloff must be >= 0 (got {})", falloff);
        }
        self.height_falloff = falloff;
        Ok(())
    }
}

impl NodeData for FogNode {
    node_data_common!(FogNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        *self = downcast_source::<FogNode>(source, "FogNode")?.clone();
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        Some(Shape::Infinite)
    }
}
