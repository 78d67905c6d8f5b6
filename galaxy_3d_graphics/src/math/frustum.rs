/// Frustum: six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D) with an inward-pointing unit normal
/// (A, B, C). A point P is inside when `dot(plane, (P, 1)) >= 0` holds for
/// every plane. Used by `CameraFrustumQuery`.

use glam::{Mat4, Vec3, Vec4};
use super::AABB;

/// Result of a 3-way frustum/AABB classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB straddles at least one plane
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes (left, right, bottom, top, near, far).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb & Hartmann plane extraction, valid for perspective and
    /// orthographic projections (depth range [0, 1] or [-1, 1] both work
    /// for the side planes; the near plane assumes the glam RH [0, 1] range).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Frustum of a camera given its view and projection matrices
    pub fn from_view_and_projection(view: &Mat4, projection: &Mat4) -> Self {
        Self::from_view_projection(&(*projection * *view))
    }

    fn signed_distance(plane: &Vec4, point: Vec3) -> f32 {
        plane.truncate().dot(point) + plane.w
    }

    /// Corner of the box furthest along `normal`
    fn positive_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min)
    }

    /// Corner of the box furthest against `normal`
    fn negative_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max)
    }

    /// Test if a point lies inside the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| Self::signed_distance(plane, point) >= 0.0)
    }

    /// Conservative AABB test: never rejects a visible box, may accept
    /// a box that is just outside a frustum corner.
    ///
    /// Infinite boxes always intersect.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_infinite() {
            return true;
        }
        self.planes.iter().all(|plane| {
            let p = Self::positive_vertex(plane.truncate(), aabb);
            Self::signed_distance(plane, p) >= 0.0
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        if aabb.is_infinite() {
            return FrustumTest::Partial;
        }

        let mut all_inside = true;
        for plane in &self.planes {
            let normal = plane.truncate();
            if Self::signed_distance(plane, Self::positive_vertex(normal, aabb)) < 0.0 {
                return FrustumTest::Outside;
            }
            if Self::signed_distance(plane, Self::negative_vertex(normal, aabb)) < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
