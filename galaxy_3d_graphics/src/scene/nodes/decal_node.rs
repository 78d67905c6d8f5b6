/// DecalNode: projects a material onto the geometry inside a box.
///
/// The box is centered on the node and projects along -Z. Its size is
/// the node shape, so world scale stretches the projection volume.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use crate::resource::MaterialInstance;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

pub struct DecalNode {
    material: Option<MaterialInstance>,
    extent: Vec3,
    normal_threshold: f32,
    draw_order: i32,
}

impl Default for DecalNode {
    fn default() -> Self {
        Self { material: None, extent: Vec3::ONE, normal_threshold: 0.5, draw_order: 0 }
    }
}

impl DecalNode {
    pub fn new(material: MaterialInstance, extent: Vec3) -> Result<Self> {
        let mut decal = Self { material: Some(material), ..Self::default() };
        decal.set_extent(extent)?;
        Ok(decal)
    }

    pub fn material(&self) -> Option<&MaterialInstance> {
        self.material.as_ref()
    }

    pub fn material_mut(&mut self) -> Option<&mut MaterialInstance> {
        self.material.as_mut()
    }

    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    /// Size of the projection box (call `SceneGraph::refresh_shape` after)
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if a component is not positive.
    pub fn set_extent(&mut self, extent: Vec3) -> Result<()> {
        if !(extent.is_finite() && extent.min_element() > 0.0) {
            engine_bail!(Configuration, "galaxy3d::DecalNode", "Invalid decal extent {:?}", extent);
        }
        self.extent = extent;
        Ok(())
    }

    /// Cosine limit between surface normal and projection direction
    pub fn normal_threshold(&self) -> f32 {
        self.normal_threshold
    }

    /// # Errors
    ///
    /// `Error::Configuration` outside [0, 1].
    pub fn set_normal_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            engine_bail!(Configuration, "galaxy3d::DecalNode",
                "normal_threshold must be in [0, 1] (got {})", threshold);
        }
        self.normal_threshold = threshold;
        Ok(())
    }

    pub fn draw_order(&self) -> i32 {
        self.draw_order
    }

    pub fn set_draw_order(&mut self, order: i32) {
        self.draw_order = order;
    }
}

impl NodeData for DecalNode {
    node_data_common!(DecalNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<DecalNode>(source, "DecalNode")?;
        self.material = source.material.clone();
        self.extent = source.extent;
        self.normal_threshold = source.normal_threshold;
        self.draw_order = source.draw_order;
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        Some(Shape::Box { extent: self.extent })
    }
}
