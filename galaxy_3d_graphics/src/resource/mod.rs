//! Shared asset definitions referenced by scene nodes.
//!
//! Everything here is immutable once built and shared through `Arc`,
//! except `MaterialInstance` and `SkeletonPose` which are per-node
//! instance data.

pub mod material;
pub mod mesh;
pub mod skeleton;
pub mod particle_system;

pub use material::{Material, MaterialDesc, MaterialInstance};
pub use mesh::{Mesh, MeshDesc, SubMesh, SubMeshDesc};
pub use skeleton::{Skeleton, SkeletonDesc, Bone, SkeletonPose};
pub use particle_system::{ParticleSystem, ParticleSystemDesc};
