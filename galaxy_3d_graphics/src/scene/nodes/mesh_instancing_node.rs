/// MeshInstancingNode: draws one shared mesh many times with hardware
/// instancing.
///
/// Instances are kept as poses, scales and colors. `upload` converts them
/// to GPU records (`InstanceData`) through a process-wide scratch array
/// and writes them into an instance buffer. The scratch array is guarded
/// by one mutex: several instancing nodes may be uploaded from different
/// threads, and reusing one grown array avoids a per-frame allocation.

use std::sync::{Arc, Mutex};
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use crate::graphics_device::Buffer;
use crate::math::{Pose, Shape};
use crate::resource::Mesh;
use crate::scene::{CloneContext, NodeData};
use crate::scene::node_data::{downcast_source, node_data_common};

/// GPU layout of one instance: column-major world matrix and color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub world: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// One instance, relative to the instancing node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub pose: Pose,
    pub scale: Vec3,
    pub color: Vec4,
}

impl Default for MeshInstance {
    fn default() -> Self {
        Self { pose: Pose::IDENTITY, scale: Vec3::ONE, color: Vec4::ONE }
    }
}

impl MeshInstance {
    fn to_gpu(self) -> InstanceData {
        InstanceData {
            world: self.pose.to_mat4_scaled(self.scale).to_cols_array_2d(),
            color: self.color.to_array(),
        }
    }
}

static SCRATCH: Mutex<Vec<InstanceData>> = Mutex::new(Vec::new());

#[derive(Default)]
pub struct MeshInstancingNode {
    mesh: Option<Arc<Mesh>>,
    instances: Vec<MeshInstance>,
}

impl MeshInstancingNode {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self { mesh: Some(mesh), instances: Vec::new() }
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// Replace the instance list (call `SceneGraph::refresh_shape` after)
    pub fn set_instances(&mut self, instances: Vec<MeshInstance>) {
        self.instances = instances;
    }

    pub fn push_instance(&mut self, instance: MeshInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Size in bytes of the instance buffer needed by `upload`
    pub fn required_buffer_size(&self) -> u64 {
        (self.instances.len() * std::mem::size_of::<InstanceData>()) as u64
    }

    /// Write every instance into `buffer` as `InstanceData` records.
    /// Returns the number of instances written.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if the buffer is too small,
    /// `Error::BackendError` if the scratch lock is poisoned or the
    /// buffer update fails.
    pub fn upload(&self, buffer: &dyn Buffer) -> Result<usize> {
        if self.instances.is_empty() {
            return Ok(0);
        }
        let required = self.required_buffer_size();
        if buffer.size() < required {
            engine_bail!(InvalidResource, "galaxy3d::MeshInstancingNode",
                "Instance buffer holds {} bytes, {} needed", buffer.size(), required);
        }

        let mut scratch = match SCRATCH.lock() {
            Ok(guard) => guard,
            Err(_) => engine_bail!("galaxy3d::MeshInstancingNode", "Instance scratch lock poisoned"),
        };
        scratch.clear();
        scratch.extend(self.instances.iter().map(|i| i.to_gpu()));
        buffer.update(0, bytemuck::cast_slice(&scratch))?;

        engine_trace!("galaxy3d::MeshInstancingNode", "Uploaded {} instances", scratch.len());
        Ok(scratch.len())
    }
}

impl NodeData for MeshInstancingNode {
    node_data_common!(MeshInstancingNode);

    fn copy_from(&mut self, source: &dyn NodeData, _context: &mut CloneContext) -> Result<()> {
        let source = downcast_source::<MeshInstancingNode>(source, "MeshInstancingNode")?;
        self.mesh = source.mesh.clone();
        self.instances = source.instances.clone();
        Ok(())
    }

    /// Union of the mesh bounds placed at every instance
    fn bounding_shape(&self) -> Option<Shape> {
        let mesh_shape = self.mesh.as_ref()?.shape();
        if mesh_shape.is_infinite() {
            return Some(Shape::Infinite);
        }
        let bounds = self
            .instances
            .iter()
            .map(|i| mesh_shape.aabb(i.scale, &i.pose))
            .reduce(|a, b| a.merged(&b));
        Some(bounds.map_or(Shape::Empty, Shape::Custom))
    }
}

