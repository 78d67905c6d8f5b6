/// LightNode: a light source.
///
/// Directional lights affect the whole scene and get an `Infinite` shape.
/// Point and spot lights are bounded by a sphere of their range.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Light along the node's -Z axis from infinitely far away
    Directional,
    Point { range: f32 },
    /// Cone along the node's -Z axis; `angle` is the half angle in radians
    Spot { range: f32, angle: f32 },
}

#[derive(Debug, Clone)]
pub struct LightNode {
    kind: LightKind,
    color: Vec3,
    intensity: f32,
}

impl Default for LightNode {
    fn default() -> Self {
        Self { kind: LightKind::Directional, color: Vec3::ONE, intensity: 1.0 }
    }
}

impl LightNode {
    pub fn directional() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a non-positive range.
    pub fn point(range: f32) -> Result<Self> {
        Self::new(LightKind::Point { range })
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a non-positive range or an angle outside
    /// (0, pi/2].
    pub fn spot(range: f32, angle: f32) -> Result<Self> {
        Self::new(LightKind::Spot { range, angle })
    }

    fn new(kind: LightKind) -> Result<Self> {
        match kind {
            LightKind::Directional => {}
            LightKind::Point { range } | LightKind::Spot { range, .. } if !(range > 0.0) => {
                engine_bail!(Configuration, "galaxy3d::LightNode", "Light range must be > 0 (got {})", range);
            }
            LightKind::Spot { angle, .. } if !(angle > 0.0 && angle <= std::f32::consts::FRAC_PI_2) => {
                engine_bail!(Configuration, "galaxy3d::LightNode",
                    "Spot angle must be in (0, pi/2] (got {})", angle);
            }
            _ => {}
        }
        Ok(Self { kind, ..Self::default() })
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn is_directional(&self) -> bool {
        self.kind == LightKind::Directional
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_color(&mut self, color: Vec3, intensity: f32) {
        self.color = color;
        self.intensity = intensity;
    }
}

impl NodeData for LightNode {
    node_data_common!(LightNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        *self = downcast_source::<LightNode>(source, "LightNode")?.clone();
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        Some(match self.kind {
            LightKind::Directional => Shape::Infinite,
            LightKind::Point { range } | LightKind::Spot { range, .. } => Shape::Sphere { radius: range },
        })
    }
}
