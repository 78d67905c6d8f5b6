/// Skeleton (shared bone hierarchy) and SkeletonPose (animated instance data).
///
/// Several mesh nodes that deform with the same skeleton share one
/// `SkeletonPose` through `Arc<Mutex<_>>`; cloning a subtree keeps that
/// sharing between the clones (see `CloneContext`).

use std::sync::Arc;
use glam::Mat4;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Pose;

/// A bone of a skeleton
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Parent bone index (always lower than this bone's index)
    pub parent: Option<usize>,
    /// Pose relative to the parent bone in the bind pose
    pub bind_pose: Pose,
}

/// Skeleton creation descriptor
pub struct SkeletonDesc {
    pub name: String,
    pub bones: Vec<Bone>,
}

/// Shared bone hierarchy
#[derive(Debug)]
pub struct Skeleton {
    name: String,
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Build a skeleton
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if a bone references a parent that is not
    /// declared before it.
    pub fn from_desc(desc: SkeletonDesc) -> Result<Self> {
        for (index, bone) in desc.bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= index {
                    engine_bail!(Configuration, "galaxy3d::Skeleton",
                        "Skeleton '{}': bone '{}' ({}) has parent {} declared after it",
                        desc.name, bone.name, index, parent);
                }
            }
        }
        Ok(Self { name: desc.name, bones: desc.bones })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }
}

/// Per-instance animated pose of a skeleton
#[derive(Debug, Clone)]
pub struct SkeletonPose {
    skeleton: Arc<Skeleton>,
    local_poses: Vec<Pose>,
}

impl SkeletonPose {
    /// Pose initialized to the bind pose
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let local_poses = skeleton.bones().iter().map(|b| b.bind_pose).collect();
        Self { skeleton, local_poses }
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn bone_count(&self) -> usize {
        self.local_poses.len()
    }

    pub fn bone_pose(&self, index: usize) -> Option<Pose> {
        self.local_poses.get(index).copied()
    }

    /// Set the parent-relative pose of a bone
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if `index` is out of range.
    pub fn set_bone_pose(&mut self, index: usize, pose: Pose) -> Result<()> {
        match self.local_poses.get_mut(index) {
            Some(slot) => {
                *slot = pose;
                Ok(())
            }
            None => engine_bail!(Configuration, "galaxy3d::SkeletonPose",
                "Bone index {} out of range ({} bones)", index, self.local_poses.len()),
        }
    }

    /// Reset every bone to the bind pose
    pub fn reset(&mut self) {
        for (slot, bone) in self.local_poses.iter_mut().zip(self.skeleton.bones()) {
            *slot = bone.bind_pose;
        }
    }

    /// Model-space transform of every bone
    pub fn model_transforms(&self) -> Vec<Mat4> {
        let mut model: Vec<Pose> = Vec::with_capacity(self.local_poses.len());
        for (pose, bone) in self.local_poses.iter().zip(self.skeleton.bones()) {
            let world = match bone.parent {
                Some(parent) => model[parent] * *pose,
                None => *pose,
            };
            model.push(world);
        }
        model.iter().map(Pose::to_mat4).collect()
    }
}

#[cfg(test)]
#[path = "skeleton_tests.rs"]
mod tests;
