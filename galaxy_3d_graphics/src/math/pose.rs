/// Pose: a rigid-body transform (position + orientation, no scale).
///
/// Scale is kept separately on scene nodes so that world transforms can
/// always be decomposed into scale, rotation and translation.

use std::ops::Mul;
use glam::{Mat3, Mat4, Quat, Vec3};
use crate::error::Result;
use crate::engine_bail;
use super::EPSILON;

/// Position and orientation of an object in a parent or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation
    pub position: Vec3,
    /// Rotation (unit quaternion)
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// No translation, no rotation
    pub const IDENTITY: Pose = Pose { position: Vec3::ZERO, orientation: Quat::IDENTITY };

    /// Create a pose from position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Translation only
    pub fn from_position(position: Vec3) -> Self {
        Self { position, orientation: Quat::IDENTITY }
    }

    /// Rotation only
    pub fn from_orientation(orientation: Quat) -> Self {
        Self { position: Vec3::ZERO, orientation }
    }

    /// Build a pose at `position` whose forward axis (-Z) points at `target`.
    ///
    /// # Errors
    ///
    /// `Error::DegenerateInput` if `position == target`, if `up` has zero
    /// length, or if `up` is parallel to the viewing direction.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Result<Self> {
        let direction = target - position;
        if direction.length_squared() < EPSILON * EPSILON {
            engine_bail!(DegenerateInput, "galaxy3d::Pose",
                "look_at: position and target are identical ({:?})", position);
        }
        if up.length_squared() < EPSILON * EPSILON {
            engine_bail!(DegenerateInput, "galaxy3d::Pose", "look_at: up vector has zero length");
        }

        let forward = direction.normalize();
        let right = forward.cross(up);
        if right.length_squared() < EPSILON {
            engine_bail!(DegenerateInput, "galaxy3d::Pose",
                "look_at: up vector is parallel to the viewing direction");
        }
        let right = right.normalize();
        let true_up = right.cross(forward);

        let basis = Mat3::from_cols(right, true_up, -forward);
        Ok(Self::new(position, Quat::from_mat3(&basis).normalize()))
    }

    /// Rotation as a 3x3 matrix
    pub fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.orientation)
    }

    /// Inverse transform
    pub fn inverse(&self) -> Self {
        let inv = self.orientation.inverse();
        Self {
            position: inv * -self.position,
            orientation: inv,
        }
    }

    /// Transform a point from local space into the space of this pose
    pub fn to_world_position(&self, local: Vec3) -> Vec3 {
        self.orientation * local + self.position
    }

    /// Transform a point into the local space of this pose
    pub fn to_local_position(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.position)
    }

    /// Rotate a direction into the space of this pose
    pub fn to_world_direction(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }

    /// Homogeneous matrix (rotation + translation)
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Homogeneous matrix with a scale applied before the rotation
    pub fn to_mat4_scaled(&self, scale: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(scale, self.orientation, self.position)
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }

    /// Compare two poses, treating `q` and `-q` as the same rotation
    pub fn approx_eq(&self, other: &Pose, tolerance: f32) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && self.orientation.dot(other.orientation).abs() >= 1.0 - tolerance
    }
}

impl Mul for Pose {
    type Output = Pose;

    /// `parent * child`: express `child` (given in the space of `self`)
    /// in the space `self` lives in.
    fn mul(self, child: Pose) -> Pose {
        Pose {
            position: self.to_world_position(child.position),
            orientation: (self.orientation * child.orientation).normalize(),
        }
    }
}

#[cfg(test)]
#[path = "pose_tests.rs"]
mod tests;
