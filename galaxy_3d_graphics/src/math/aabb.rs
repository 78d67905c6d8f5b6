// ===== AABB =====

use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box
///
/// Cached in world space on every scene node and used by the scene
/// queries for overlap and frustum tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Box covering all of space (used by `Shape::Infinite`)
    pub const INFINITE: AABB = AABB {
        min: Vec3::splat(f32::NEG_INFINITY),
        max: Vec3::splat(f32::INFINITY),
    };

    /// Create a box from two corners (components are sorted)
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Degenerate box containing a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Box centered at `center` with the given half extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        let h = half_extent.abs();
        Self { min: center - h, max: center + h }
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether any bound is infinite
    pub fn is_infinite(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite()
    }

    /// Smallest box containing both boxes
    pub fn merged(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Transform this box by a matrix, returning a new box.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the box
    /// extents for a tight result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_infinite() {
            return AABB::INFINITE;
        }

        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this box fully contains another box.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Test if this box contains a point.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Test if this box intersects (overlaps or touches) another box.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
