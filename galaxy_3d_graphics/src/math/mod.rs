//! Math primitives for the scene graph.
//!
//! `glam` supplies vectors, quaternions and matrices. This module adds the
//! rigid-body `Pose`, the axis-aligned bounding box, bounding shapes with
//! the `Empty`/`Infinite` sentinels, and frustum culling.

mod pose;
mod aabb;
mod shape;
mod frustum;

pub use pose::Pose;
pub use aabb::AABB;
pub use shape::Shape;
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};

/// Tolerance used for degenerate-input detection and uniform-scale checks
pub const EPSILON: f32 = 1e-6;
