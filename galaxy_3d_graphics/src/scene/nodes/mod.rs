//! Concrete node kinds.
//!
//! Each kind implements `NodeData`. Shared definitions (meshes, cameras,
//! particle systems, base materials) are held through `Arc` and stay
//! shared when a node is cloned; instance data (material bindings,
//! skeleton poses, instance lists) is duplicated.

mod group_node;
mod model_node;
mod mesh_node;
mod mesh_instancing_node;
mod camera_node;
mod light_node;
mod decal_node;
mod fog_node;
mod particle_system_node;
mod terrain_node;
mod lod_group_node;

pub use group_node::GroupNode;
pub use model_node::ModelNode;
pub use mesh_node::MeshNode;
pub use mesh_instancing_node::{MeshInstancingNode, MeshInstance, InstanceData};
pub use camera_node::CameraNode;
pub use light_node::{LightNode, LightKind};
pub use decal_node::DecalNode;
pub use fog_node::FogNode;
pub use particle_system_node::ParticleSystemNode;
pub use terrain_node::TerrainNode;
pub use lod_group_node::{LodGroupNode, LodLevel};

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod tests;
