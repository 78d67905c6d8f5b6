/// Shape: bounding volumes of scene nodes.
///
/// `Empty` and `Infinite` are sentinels: an empty node never overlaps
/// anything in a scene query, an infinite node always does and skips the
/// AABB computation entirely.

use glam::{Mat3, Vec3};
use super::{AABB, Pose};

/// Bounding volume in the local space of a node (before scale and pose)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// No volume (default for new nodes)
    Empty,
    /// Unbounded volume (sky, global fog, directional lights)
    Infinite,
    /// Box centered on the origin, `extent` is the full size per axis
    Box { extent: Vec3 },
    /// Sphere centered on the origin
    Sphere { radius: f32 },
    /// Capsule along the local Y axis, `height` includes both caps
    Capsule { radius: f32, height: f32 },
    /// Arbitrary local box (may be off-center)
    Custom(AABB),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Empty
    }
}

impl Shape {
    /// Whether this is the `Empty` sentinel
    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Empty)
    }

    /// Whether this is the `Infinite` sentinel
    pub fn is_infinite(&self) -> bool {
        matches!(self, Shape::Infinite)
    }

    /// World-space bounding box for the given world scale and pose.
    ///
    /// `Empty` collapses to the pose position, `Infinite` covers all space.
    pub fn aabb(&self, scale: Vec3, pose: &Pose) -> AABB {
        match *self {
            Shape::Empty => AABB::from_point(pose.position),
            Shape::Infinite => AABB::INFINITE,
            Shape::Box { extent } => {
                Self::oriented_box(pose, Vec3::ZERO, extent * 0.5 * scale.abs())
            }
            Shape::Sphere { radius } => {
                let r = radius.abs() * scale.abs().max_element();
                AABB::from_center_half_extent(pose.position, Vec3::splat(r))
            }
            Shape::Capsule { radius, height } => {
                let r = radius.abs();
                let half_height = (height.abs() * 0.5).max(r);
                Self::oriented_box(pose, Vec3::ZERO, Vec3::new(r, half_height, r) * scale.abs())
            }
            Shape::Custom(local) => {
                // Scale the corners first; negative scale mirrors the box
                let scaled = AABB::new(local.min * scale, local.max * scale);
                Self::oriented_box(pose, scaled.center(), scaled.extent() * 0.5)
            }
        }
    }

    /// AABB of a box with local center/half-extent after rotation and translation
    fn oriented_box(pose: &Pose, center: Vec3, half_extent: Vec3) -> AABB {
        let rotation = Mat3::from_quat(pose.orientation);
        let abs_rotation = Mat3::from_cols(
            rotation.x_axis.abs(),
            rotation.y_axis.abs(),
            rotation.z_axis.abs(),
        );
        AABB::from_center_half_extent(pose.to_world_position(center), abs_rotation * half_extent)
    }
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod tests;
