/// CameraView: per-frame snapshot of a camera node.
///
/// Filters read matrices and depth range from the snapshot instead of
/// reaching back into the scene graph.

use glam::{Mat4, Vec3};
use crate::math::Pose;
use super::Camera;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub projection: Mat4,
    /// View matrix of the previous frame (equal to `view` if unknown)
    pub last_view: Mat4,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    /// Per-node LOD bias of the camera node
    pub lod_bias: f32,
    /// See `Projection::scale_factor`
    pub projection_scale: f32,
}

impl CameraView {
    /// Snapshot a camera placed at `pose_world`
    pub fn new(camera: &Camera, pose_world: Pose, last_pose_world: Option<Pose>, lod_bias: f32) -> Self {
        let view = pose_world.inverse().to_mat4();
        let last_view = last_pose_world.map(|p| p.inverse().to_mat4()).unwrap_or(view);
        let projection = camera.projection();
        Self {
            view,
            projection: projection.to_mat4(),
            last_view,
            position: pose_world.position,
            near: projection.near(),
            far: projection.far(),
            lod_bias,
            projection_scale: projection.scale_factor(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn last_view_projection(&self) -> Mat4 {
        self.projection * self.last_view
    }

    /// Distance of `position` to the camera, normalized by the projection
    /// scale and the camera LOD bias
    pub fn view_normalized_distance(&self, position: Vec3) -> f32 {
        let scale = self.projection_scale.abs();
        let distance = (position - self.position).length();
        if scale > 0.0 {
            distance / scale * self.lod_bias
        } else {
            distance * self.lod_bias
        }
    }
}
