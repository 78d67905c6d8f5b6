/// MeshNode: places a shared mesh in the scene.
///
/// The mesh (and the base materials it references) stay shared between
/// clones. Material instances are per node. The skeleton pose may be
/// shared by several mesh nodes of one model; a subtree clone keeps that
/// sharing between the cloned nodes, against a single new pose.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use crate::resource::{MaterialInstance, Mesh, SkeletonPose};
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

#[derive(Default)]
pub struct MeshNode {
    mesh: Option<Arc<Mesh>>,
    materials: Vec<MaterialInstance>,
    skeleton_pose: Option<Arc<Mutex<SkeletonPose>>>,
}

impl MeshNode {
    /// Bind a mesh with one material instance per mesh material and, for
    /// skinned meshes, a bind-pose skeleton pose of its own
    pub fn new(mesh: Arc<Mesh>) -> Self {
        let materials = mesh.materials().iter().cloned().map(MaterialInstance::new).collect();
        let skeleton_pose = mesh
            .skeleton()
            .map(|skeleton| Arc::new(Mutex::new(SkeletonPose::new(skeleton.clone()))));
        Self { mesh: Some(mesh), materials, skeleton_pose }
    }

    /// Use a skeleton pose shared with other nodes
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the mesh is not skinned or the pose
    /// belongs to another skeleton.
    pub fn with_skeleton_pose(mut self, pose: Arc<Mutex<SkeletonPose>>) -> Result<Self> {
        let Some(skeleton) = self.mesh.as_ref().and_then(|m| m.skeleton()) else {
            engine_bail!(Configuration, "galaxy3d::MeshNode", "Mesh has no skeleton");
        };
        let matches = match pose.lock() {
            Ok(guard) => Arc::ptr_eq(guard.skeleton(), skeleton),
            Err(_) => engine_bail!("galaxy3d::MeshNode", "Skeleton pose lock poisoned"),
        };
        if !matches {
            engine_bail!(Configuration, "galaxy3d::MeshNode",
                "Skeleton pose does not belong to skeleton '{}'", skeleton.name());
        }
        self.skeleton_pose = Some(pose);
        Ok(self)
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn materials(&self) -> &[MaterialInstance] {
        &self.materials
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut MaterialInstance> {
        self.materials.get_mut(index)
    }

    pub fn skeleton_pose(&self) -> Option<&Arc<Mutex<SkeletonPose>>> {
        self.skeleton_pose.as_ref()
    }
}

impl NodeData for MeshNode {
    node_data_common!(MeshNode);

    fn copy_from(&mut self, source: &dyn NodeData, context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<MeshNode>(source, "MeshNode")?;
        self.mesh = source.mesh.clone();
        self.materials = source.materials.clone();
        self.skeleton_pose = match &source.skeleton_pose {
            Some(pose) => Some(context.clone_shared(pose)?),
            None => None,
        };
        Ok(())
    }

    fn bounding_shape(&self) -> Option<Shape> {
        self.mesh.as_ref().map(|m| m.shape())
    }
}
