/// Tests for the scene queries
///
/// The camera used for LOD sits at the origin looking down -Z with a 90
/// degree vertical field of view, so view-normalized distances equal
/// plain distances (for unit scale and unit LOD biases).

use super::*;
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;
use glam::{Vec2, Vec3};
use crate::camera::{Camera, Projection};
use crate::error::Error;
use crate::math::Shape;
use crate::render::RenderContext;
use crate::scene::{
    CameraNode, GroupNode, LightNode, LodGroupNode, NodeFlags, NodeKey, Scene, TerrainNode,
};

// ============================================================================
// Test helpers
// ============================================================================

struct Fixture {
    scene: Scene,
    camera: NodeKey,
    sun: NodeKey,
    lamp: NodeKey,
}

fn fixture() -> Fixture {
    let mut scene = Scene::new("test");
    let projection = Projection::perspective(FRAC_PI_2, 1.0, 0.1, 1000.0).unwrap();
    let camera = scene
        .add_node("camera", CameraNode::new(Arc::new(Camera::new("main", projection).unwrap())))
        .unwrap();
    let sun = scene.add_node("sun", LightNode::directional()).unwrap();
    let lamp = scene.add_node("lamp", LightNode::point(10.0).unwrap()).unwrap();
    Fixture { scene, camera, sun, lamp }
}

fn add_caster(scene: &mut Scene, parent: Option<NodeKey>, name: &str, position: Vec3) -> NodeKey {
    let parent = parent.unwrap_or(scene.root());
    let key = scene.add_node_to(parent, name, GroupNode).unwrap();
    let graph = scene.graph_mut();
    graph.set_shape(key, Shape::Sphere { radius: 1.0 }).unwrap();
    graph.set_position_local(key, position).unwrap();
    graph.set_flags(key, NodeFlags::CASTS_SHADOWS | NodeFlags::RENDERABLE, true).unwrap();
    key
}

fn lod_context(f: &Fixture) -> RenderContext {
    let mut context = RenderContext::new();
    context.set_lod_camera(f.scene.graph(), f.camera).unwrap();
    context
}

fn casters(scene: &mut Scene, reference: NodeKey, context: &RenderContext) -> Vec<NodeKey> {
    scene.query::<ShadowCasterQuery>(reference, context).unwrap().casters().to_vec()
}

// ============================================================================
// Tests: Shadow-caster predicate
// ============================================================================

#[test]
fn test_non_caster_never_returned() {
    let mut f = fixture();
    let caster = add_caster(&mut f.scene, None, "caster", Vec3::ZERO);
    let plain = add_caster(&mut f.scene, None, "plain", Vec3::ZERO);
    f.scene.graph_mut().set_flags(plain, NodeFlags::CASTS_SHADOWS, false).unwrap();

    let result = casters(&mut f.scene, f.sun, &RenderContext::new());
    assert_eq!(result, vec![caster]);
}

#[test]
fn test_empty_shape_never_returned() {
    let mut f = fixture();
    let caster = add_caster(&mut f.scene, None, "caster", Vec3::ZERO);
    f.scene.graph_mut().set_shape(caster, Shape::Empty).unwrap();

    assert!(casters(&mut f.scene, f.sun, &RenderContext::new()).is_empty());
}

#[test]
fn test_point_light_uses_bounds_overlap() {
    let mut f = fixture();
    let near = add_caster(&mut f.scene, None, "near", Vec3::new(5.0, 0.0, 0.0));
    let far = add_caster(&mut f.scene, None, "far", Vec3::new(50.0, 0.0, 0.0));

    let result = casters(&mut f.scene, f.lamp, &RenderContext::new());
    assert!(result.contains(&near));
    assert!(!result.contains(&far));

    // Directional lights reach everything
    let result = casters(&mut f.scene, f.sun, &RenderContext::new());
    assert!(result.contains(&near) && result.contains(&far));
}

#[test]
fn test_terrain_only_for_directional_lights() {
    let mut f = fixture();
    let terrain = f.scene
        .add_node("terrain", TerrainNode::new(Vec2::splat(100.0), 0.0, 5.0).unwrap())
        .unwrap();
    f.scene.graph_mut().set_flags(terrain, NodeFlags::CASTS_SHADOWS, true).unwrap();

    assert!(casters(&mut f.scene, f.sun, &RenderContext::new()).contains(&terrain));
    assert!(!casters(&mut f.scene, f.lamp, &RenderContext::new()).contains(&terrain));
}

#[test]
fn test_shadow_caster_culled_only_skipped_for_directional() {
    let mut f = fixture();
    let caster = add_caster(&mut f.scene, None, "caster", Vec3::new(2.0, 0.0, 0.0));
    f.scene.graph_mut().set_flags(caster, NodeFlags::SHADOW_CASTER_CULLED, true).unwrap();

    assert!(!casters(&mut f.scene, f.sun, &RenderContext::new()).contains(&caster));
    assert!(casters(&mut f.scene, f.lamp, &RenderContext::new()).contains(&caster));
}

#[test]
fn test_non_light_reference_uses_context_reference() {
    let mut f = fixture();
    let pivot = f.scene.add_node("pivot", GroupNode).unwrap();
    f.scene.graph_mut().set_shape(pivot, Shape::Infinite).unwrap();
    let terrain = f.scene
        .add_node("terrain", TerrainNode::new(Vec2::splat(10.0), 0.0, 1.0).unwrap())
        .unwrap();
    f.scene.graph_mut().set_flags(terrain, NodeFlags::CASTS_SHADOWS, true).unwrap();

    assert!(!casters(&mut f.scene, pivot, &RenderContext::new()).contains(&terrain));

    let mut context = RenderContext::new();
    context.reference_node = Some(f.sun);
    f.scene.clear_query_cache();
    assert!(casters(&mut f.scene, pivot, &context).contains(&terrain));
}

#[test]
fn test_disabled_nodes_not_returned() {
    let mut f = fixture();
    let group = f.scene.add_node("group", GroupNode).unwrap();
    let child = add_caster(&mut f.scene, Some(group), "child", Vec3::ZERO);
    f.scene.graph_mut().set_enabled(group, false).unwrap();

    assert!(!casters(&mut f.scene, f.sun, &RenderContext::new()).contains(&child));
}

// ============================================================================
// Tests: Distance culling
// ============================================================================

#[test]
fn test_max_distance_culling_with_lod_camera() {
    let mut f = fixture();
    let close = add_caster(&mut f.scene, None, "close", Vec3::new(0.0, 0.0, -50.0));
    let culled = add_caster(&mut f.scene, None, "culled", Vec3::new(0.0, 0.0, -50.0));
    f.scene.graph_mut().set_max_distance(close, 100.0).unwrap();
    f.scene.graph_mut().set_max_distance(culled, 30.0).unwrap();

    let context = lod_context(&f);
    let result = casters(&mut f.scene, f.sun, &context);
    assert!(result.contains(&close));
    assert!(!result.contains(&culled));

    // Without a LOD camera nothing is distance culled
    f.scene.clear_query_cache();
    let result = casters(&mut f.scene, f.sun, &RenderContext::new());
    assert!(result.contains(&culled));
}

#[test]
fn test_scale_and_lod_bias_affect_distance() {
    let mut f = fixture();
    let big = add_caster(&mut f.scene, None, "big", Vec3::new(0.0, 0.0, -50.0));
    f.scene.graph_mut().set_max_distance(big, 30.0).unwrap();
    f.scene.graph_mut().set_scale_local(big, Vec3::splat(2.0)).unwrap();

    // 50 / 2 = 25 < 30
    let mut context = lod_context(&f);
    assert!(casters(&mut f.scene, f.sun, &context).contains(&big));

    // 50 * 2 / 2 = 50 >= 30
    context.lod_bias = 2.0;
    f.scene.clear_query_cache();
    assert!(!casters(&mut f.scene, f.sun, &context).contains(&big));
}

#[test]
fn test_lod_distance_helper() {
    let f = fixture();
    let context = lod_context(&f);
    let view = context.lod_camera().unwrap();

    let d = lod_distance(f.scene.graph(), f.camera, view, 1.0).unwrap();
    assert!(d.abs() < 1e-4);

    let mut zero = Scene::new("zero");
    let flat = zero.add_node("flat", GroupNode).unwrap();
    zero.graph_mut().set_scale_local(flat, Vec3::ZERO).unwrap();
    assert_eq!(lod_distance(zero.graph(), flat, view, 1.0).unwrap(), f32::INFINITY);
}

// ============================================================================
// Tests: LOD resolution
// ============================================================================

fn lod_group(f: &mut Fixture, position: Vec3) -> (NodeKey, NodeKey, NodeKey) {
    let group = f.scene.add_node("lod", LodGroupNode::default()).unwrap();
    f.scene.graph_mut().set_position_local(group, position).unwrap();
    let high = f.scene.graph_mut().create_node("high", GroupNode);
    let low = f.scene.graph_mut().create_node("low", GroupNode);
    for level in [high, low] {
        f.scene.graph_mut().set_shape(level, Shape::Sphere { radius: 1.0 }).unwrap();
        f.scene.graph_mut().set_flags(level, NodeFlags::CASTS_SHADOWS | NodeFlags::RENDERABLE, true).unwrap();
    }
    f.scene.graph_mut().add_lod_level(group, high, 0.0).unwrap();
    f.scene.graph_mut().add_lod_level(group, low, 20.0).unwrap();
    (group, high, low)
}

#[test]
fn test_lod_group_resolves_to_selected_level() {
    let mut f = fixture();
    let (group, high, low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -10.0));
    let context = lod_context(&f);

    let result = casters(&mut f.scene, f.sun, &context);
    assert_eq!(result, vec![high]);
    assert!(!result.contains(&group));

    f.scene.graph_mut().set_position_local(group, Vec3::new(0.0, 0.0, -30.0)).unwrap();
    let context = lod_context(&f);
    let result = casters(&mut f.scene, f.sun, &context);
    assert_eq!(result, vec![low]);
}

#[test]
fn test_cloned_lod_level_is_a_plain_caster() {
    let mut f = fixture();
    let (_group, high, _low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -10.0));
    let root = f.scene.root();
    let copy = f.scene.graph_mut().clone_subtree(high).unwrap();
    f.scene.graph_mut().add_child(root, copy).unwrap();

    let result = casters(&mut f.scene, f.sun, &RenderContext::new());
    assert!(result.contains(&copy));
    assert!(result.contains(&high));
}

#[test]
fn test_lod_group_without_lod_camera_uses_first_level() {
    let mut f = fixture();
    let (_group, high, _low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -30.0));

    assert_eq!(casters(&mut f.scene, f.sun, &RenderContext::new()), vec![high]);
}

#[test]
fn test_lod_group_culled_by_its_max_distance() {
    let mut f = fixture();
    let (group, _high, _low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -30.0));
    f.scene.graph_mut().set_max_distance(group, 25.0).unwrap();
    let context = lod_context(&f);

    assert!(casters(&mut f.scene, f.sun, &context).is_empty());
}

#[test]
fn test_lod_level_subtree_honors_enabled() {
    let mut f = fixture();
    let (_group, high, _low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -5.0));
    let detail = add_caster(&mut f.scene, Some(high), "detail", Vec3::ZERO);
    let hidden = f.scene.add_node_to(high, "hidden", GroupNode).unwrap();
    let below_hidden = add_caster(&mut f.scene, Some(hidden), "below_hidden", Vec3::ZERO);
    f.scene.graph_mut().set_enabled(hidden, false).unwrap();
    let context = lod_context(&f);

    let result = casters(&mut f.scene, f.sun, &context);
    assert!(result.contains(&high));
    assert!(result.contains(&detail));
    assert!(!result.contains(&below_hidden));
}

#[test]
fn test_nested_lod_groups_resolve_recursively() {
    let mut f = fixture();
    let (_outer, high, _low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -15.0));

    // Inner group hangs below the outer high level
    let inner = f.scene.add_node_to(high, "inner", LodGroupNode::default()).unwrap();
    let inner_near = f.scene.graph_mut().create_node("inner_near", GroupNode);
    let inner_far = f.scene.graph_mut().create_node("inner_far", GroupNode);
    for level in [inner_near, inner_far] {
        f.scene.graph_mut().set_shape(level, Shape::Sphere { radius: 1.0 }).unwrap();
        f.scene.graph_mut().set_flags(level, NodeFlags::CASTS_SHADOWS, true).unwrap();
    }
    f.scene.graph_mut().add_lod_level(inner, inner_near, 0.0).unwrap();
    f.scene.graph_mut().add_lod_level(inner, inner_far, 10.0).unwrap();
    let context = lod_context(&f);

    // Outer at 15 selects `high`; inner at 15 selects `inner_far`
    let result = casters(&mut f.scene, f.sun, &context);
    assert!(result.contains(&high));
    assert!(result.contains(&inner_far));
    assert!(!result.contains(&inner_near));
    assert!(!result.contains(&inner));
}

// ============================================================================
// Tests: Query container
// ============================================================================

#[test]
fn test_reset_keeps_container_reusable() {
    let mut f = fixture();
    add_caster(&mut f.scene, None, "caster", Vec3::ZERO);
    let candidates = f.scene.candidates(Some(f.sun)).unwrap();

    let mut query = ShadowCasterQuery::default();
    query.set(f.sun, &candidates, f.scene.graph(), &RenderContext::new()).unwrap();
    assert_eq!(query.reference_node(), Some(f.sun));
    assert_eq!(query.len(), 1);

    query.reset();
    assert_eq!(query.reference_node(), None);
    assert!(query.is_empty());
}

// ============================================================================
// Tests: CameraFrustumQuery
// ============================================================================

#[test]
fn test_frustum_query_returns_visible_renderables() {
    let mut f = fixture();
    let front = add_caster(&mut f.scene, None, "front", Vec3::new(0.0, 0.0, -10.0));
    let behind = add_caster(&mut f.scene, None, "behind", Vec3::new(0.0, 0.0, 10.0));
    let hidden = add_caster(&mut f.scene, None, "not_renderable", Vec3::new(0.0, 0.0, -10.0));
    f.scene.graph_mut().set_flags(hidden, NodeFlags::RENDERABLE, false).unwrap();

    let result = f.scene.query::<CameraFrustumQuery>(f.camera, &RenderContext::new()).unwrap();
    assert!(result.contains(front));
    assert!(!result.contains(behind));
    assert!(!result.contains(hidden));
}

#[test]
fn test_frustum_query_resolves_lod_with_queried_camera() {
    let mut f = fixture();
    let (_group, _high, low) = lod_group(&mut f, Vec3::new(0.0, 0.0, -30.0));

    let result = f.scene.query::<CameraFrustumQuery>(f.camera, &RenderContext::new()).unwrap();
    assert_eq!(result.visible(), &[low]);
}

#[test]
fn test_frustum_query_requires_camera() {
    let mut f = fixture();
    let result = f.scene.query::<CameraFrustumQuery>(f.sun, &RenderContext::new());
    assert!(matches!(result, Err(Error::Configuration(_))));
}
