use glam::{Mat4, Quat, Vec3};
use super::*;

#[test]
fn test_new_sorts_corners() {
    let aabb = AABB::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.center(), Vec3::ZERO);
    assert_eq!(aabb.extent(), Vec3::new(2.0, 4.0, 6.0));
}

#[test]
fn test_intersects_and_contains() {
    let a = AABB::new(Vec3::ZERO, Vec3::splat(2.0));
    let b = AABB::new(Vec3::splat(1.0), Vec3::splat(3.0));
    let c = AABB::new(Vec3::splat(5.0), Vec3::splat(6.0));
    let inner = AABB::new(Vec3::splat(0.5), Vec3::splat(1.5));

    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert!(a.contains(&inner));
    assert!(!a.contains(&b));

    // Touching faces count as intersecting
    let touching = AABB::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0));
    assert!(a.intersects(&touching));
}

#[test]
fn test_merged() {
    let a = AABB::new(Vec3::ZERO, Vec3::ONE);
    let b = AABB::new(Vec3::splat(-1.0), Vec3::splat(0.5));
    let m = a.merged(&b);
    assert_eq!(m.min, Vec3::splat(-1.0));
    assert_eq!(m.max, Vec3::ONE);
}

#[test]
fn test_transformed_by_rotation_and_translation() {
    let aabb = AABB::new(Vec3::new(-2.0, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
    let matrix = Mat4::from_rotation_translation(
        Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, 10.0, 0.0),
    );
    let t = aabb.transformed(&matrix);
    assert!(t.min.abs_diff_eq(Vec3::new(-1.0, 8.0, -1.0), 1e-5));
    assert!(t.max.abs_diff_eq(Vec3::new(1.0, 12.0, 1.0), 1e-5));
}

#[test]
fn test_infinite_stays_infinite() {
    assert!(AABB::INFINITE.is_infinite());
    assert!(AABB::INFINITE.transformed(&Mat4::from_scale(Vec3::splat(2.0))).is_infinite());
    assert!(AABB::INFINITE.intersects(&AABB::from_point(Vec3::splat(1.0e20))));
}
