/// CameraNode: places a shared camera definition in the scene.
///
/// The node pose is the camera pose (looking down -Z). Each node carries
/// its own LOD bias, which scales view-normalized distances computed
/// from this camera.

use std::sync::Arc;
use crate::camera::{Camera, CameraView};
use crate::error::Result;
use crate::engine_bail;
use crate::scene::{CloneContext, NodeData, NodeKey, SceneGraph};
use crate::scene::node_data::{downcast_source, node_data_common};

pub struct CameraNode {
    camera: Option<Arc<Camera>>,
    lod_bias: f32,
}

impl Default for CameraNode {
    fn default() -> Self {
        Self { camera: None, lod_bias: 1.0 }
    }
}

impl CameraNode {
    pub fn new(camera: Arc<Camera>) -> Self {
        Self { camera: Some(camera), lod_bias: 1.0 }
    }

    pub fn camera(&self) -> Option<&Arc<Camera>> {
        self.camera.as_ref()
    }

    pub fn lod_bias(&self) -> f32 {
        self.lod_bias
    }

    /// # Errors
    ///
    /// `Error::Configuration` for a non-positive or non-finite bias.
    pub fn set_lod_bias(&mut self, lod_bias: f32) -> Result<()> {
        if !(lod_bias.is_finite() && lod_bias > 0.0) {
            engine_bail!(Configuration, "galaxy3d::CameraNode",
                "lod_bias must be positive and finite (got {})", lod_bias);
        }
        self.lod_bias = lod_bias;
        Ok(())
    }
}

impl NodeData for CameraNode {
    node_data_common!(CameraNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<CameraNode>(source, "CameraNode")?;
        self.camera = source.camera.clone();
        self.lod_bias = source.lod_bias;
        Ok(())
    }
}

impl SceneGraph {
    /// Snapshot of a camera node for the current frame
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if `key` is not a camera node or has no
    /// camera assigned.
    pub fn camera_view(&self, key: NodeKey) -> Result<CameraView> {
        let node = self.node(key)?;
        let Some(camera_node) = node.data_as::<CameraNode>() else {
            engine_bail!(Configuration, "galaxy3d::SceneGraph",
                "Node '{}' is a {}, not a camera", node.name(), node.type_name());
        };
        let Some(camera) = camera_node.camera() else {
            engine_bail!(Configuration, "galaxy3d::SceneGraph",
                "Camera node '{}' has no camera", node.name());
        };
        Ok(CameraView::new(camera, self.pose_world(key)?, node.last_pose_world(), camera_node.lod_bias()))
    }
}
