use glam::{Quat, Vec3};
use crate::error::Error;
use crate::math::Pose;
use crate::camera::CameraView;
use super::*;

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_perspective_validation() {
    assert!(Projection::perspective(1.0, 1.5, 0.1, 100.0).is_ok());
    assert!(matches!(Projection::perspective(0.0, 1.5, 0.1, 100.0), Err(Error::Configuration(_))));
    assert!(Projection::perspective(1.0, 1.5, 10.0, 1.0).is_err());
    assert!(Projection::perspective(1.0, -1.0, 0.1, 100.0).is_err());
}

#[test]
fn test_orthographic_validation() {
    assert!(Projection::orthographic(10.0, 5.0, 0.1, 50.0).is_ok());
    assert!(Projection::orthographic(0.0, 5.0, 0.1, 50.0).is_err());
}

#[test]
fn test_scale_factor_of_ninety_degree_fov_is_one() {
    let projection = Projection::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0).unwrap();
    assert!((projection.scale_factor() - 1.0).abs() < 1e-5);
    assert_eq!(projection.near(), 0.1);
    assert_eq!(projection.far(), 100.0);
}

#[test]
fn test_camera_rejects_invalid_projection() {
    let bad = Projection::Perspective { fov_y: 1.0, aspect: 1.0, near: 0.0, far: 10.0 };
    assert!(Camera::new("main", bad).is_err());
}

// ============================================================================
// CameraView
// ============================================================================

#[test]
fn test_camera_view_matrices() {
    let camera = Camera::new("main",
        Projection::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.5, 200.0).unwrap()).unwrap();
    let pose = Pose::new(Vec3::new(0.0, 0.0, 10.0), Quat::IDENTITY);
    let view = CameraView::new(&camera, pose, None, 2.0);

    // World origin is 10 units in front of the camera
    let p = view.view.transform_point3(Vec3::ZERO);
    assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    assert_eq!(view.last_view, view.view);
    assert_eq!(view.near, 0.5);
    assert_eq!(view.far, 200.0);

    // Scale factor 1, lod bias 2
    assert!((view.view_normalized_distance(Vec3::ZERO) - 20.0).abs() < 1e-4);
}

#[test]
fn test_camera_view_uses_last_pose() {
    let camera = Camera::new("main",
        Projection::perspective(1.0, 1.0, 0.1, 100.0).unwrap()).unwrap();
    let now = Pose::from_position(Vec3::new(1.0, 0.0, 0.0));
    let before = Pose::from_position(Vec3::ZERO);
    let view = CameraView::new(&camera, now, Some(before), 1.0);

    assert_ne!(view.view, view.last_view);
    assert_eq!(view.last_view_projection(), view.projection * before.inverse().to_mat4());
}
