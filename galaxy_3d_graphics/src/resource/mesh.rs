//! Resource-level mesh types.
//!
//! A `Mesh` is shared between every node that displays it: cloning a
//! `MeshNode` never duplicates the mesh.
//!
//! # Hierarchy
//!
//! ```text
//! Mesh "hero"
//! ├── bounding shape (local space)
//! ├── materials (default per-submesh materials)
//! ├── skeleton (optional)
//! └── submeshes
//!     ├── "body"  → material 0
//!     └── "armor" → material 1
//! ```

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use super::{Material, Skeleton};

// ============================================================================
// SUBMESH
// ============================================================================

/// A drawable region of the mesh buffers
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    name: String,
    index_offset: u32,
    index_count: u32,
    material_index: usize,
}

impl SubMesh {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_offset(&self) -> u32 {
        self.index_offset
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Index into `Mesh::materials`
    pub fn material_index(&self) -> usize {
        self.material_index
    }
}

/// Submesh descriptor
pub struct SubMeshDesc {
    pub name: String,
    pub index_offset: u32,
    pub index_count: u32,
    pub material_index: usize,
}

// ============================================================================
// MESH
// ============================================================================

/// Shared mesh definition
#[derive(Debug)]
pub struct Mesh {
    name: String,
    shape: Shape,
    materials: Vec<Arc<Material>>,
    submeshes: Vec<SubMesh>,
    skeleton: Option<Arc<Skeleton>>,
}

/// Mesh creation descriptor
pub struct MeshDesc {
    pub name: String,
    /// Local-space bounding shape, copied to the node displaying the mesh
    pub shape: Shape,
    pub materials: Vec<Arc<Material>>,
    pub submeshes: Vec<SubMeshDesc>,
    pub skeleton: Option<Arc<Skeleton>>,
}

impl Mesh {
    /// Build a mesh
    ///
    /// # Errors
    ///
    /// `Error::Configuration` on duplicate submesh names or a submesh
    /// referencing a material that does not exist.
    pub fn from_desc(desc: MeshDesc) -> Result<Self> {
        let mut submeshes: Vec<SubMesh> = Vec::with_capacity(desc.submeshes.len());
        for sub in desc.submeshes {
            if submeshes.iter().any(|s| s.name == sub.name) {
                engine_bail!(Configuration, "galaxy3d::Mesh",
                    "Mesh '{}': duplicate submesh name '{}'", desc.name, sub.name);
            }
            if sub.material_index >= desc.materials.len() {
                engine_bail!(Configuration, "galaxy3d::Mesh",
                    "Mesh '{}': submesh '{}' uses material {} but only {} exist",
                    desc.name, sub.name, sub.material_index, desc.materials.len());
            }
            submeshes.push(SubMesh {
                name: sub.name,
                index_offset: sub.index_offset,
                index_count: sub.index_count,
                material_index: sub.material_index,
            });
        }

        Ok(Self {
            name: desc.name,
            shape: desc.shape,
            materials: desc.materials,
            submeshes,
            skeleton: desc.skeleton,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    pub fn submesh(&self, name: &str) -> Option<&SubMesh> {
        self.submeshes.iter().find(|s| s.name == name)
    }

    pub fn skeleton(&self) -> Option<&Arc<Skeleton>> {
        self.skeleton.as_ref()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
