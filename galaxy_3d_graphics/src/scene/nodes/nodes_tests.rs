/// Tests for the concrete node kinds
///
/// These tests validate the shared/instance split of the clone protocol,
/// node bounding shapes, instancing uploads, camera snapshots and LOD
/// groups.

use super::*;
use std::sync::{Arc, Mutex};
use glam::{Vec2, Vec3, Vec4};
use crate::camera::{Camera, Projection};
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockBuffer;
use crate::graphics_device::ParamValue;
use crate::math::{Pose, Shape, AABB};
use crate::resource::{
    Bone, Material, MaterialDesc, Mesh, MeshDesc, ParticleSystem, ParticleSystemDesc,
    Skeleton, SkeletonDesc, SkeletonPose, SubMeshDesc,
};
use crate::scene::{NodeData, NodeKey, SceneGraph};

// ============================================================================
// Test helpers
// ============================================================================

fn material() -> Arc<Material> {
    Arc::new(Material::from_desc(MaterialDesc {
        name: "mat".to_string(),
        effect: "lit".to_string(),
        params: vec![("roughness".to_string(), ParamValue::Float(0.5))],
    }).unwrap())
}

fn skinned_mesh() -> Arc<Mesh> {
    let skeleton = Arc::new(Skeleton::from_desc(SkeletonDesc {
        name: "rig".to_string(),
        bones: vec![
            Bone { name: "hip".to_string(), parent: None, bind_pose: Pose::IDENTITY },
            Bone {
                name: "knee".to_string(),
                parent: Some(0),
                bind_pose: Pose::from_position(Vec3::new(0.0, -1.0, 0.0)),
            },
        ],
    }).unwrap());

    Arc::new(Mesh::from_desc(MeshDesc {
        name: "character".to_string(),
        shape: Shape::Box { extent: Vec3::new(1.0, 2.0, 1.0) },
        materials: vec![material()],
        submeshes: vec![SubMeshDesc {
            name: "body".to_string(),
            index_offset: 0,
            index_count: 36,
            material_index: 0,
        }],
        skeleton: Some(skeleton),
    }).unwrap())
}

fn static_mesh() -> Arc<Mesh> {
    Arc::new(Mesh::from_desc(MeshDesc {
        name: "crate".to_string(),
        shape: Shape::Box { extent: Vec3::splat(2.0) },
        materials: vec![material()],
        submeshes: vec![],
        skeleton: None,
    }).unwrap())
}

fn read_records(buffer: &MockBuffer) -> Vec<InstanceData> {
    let data = buffer.data.lock().unwrap();
    data.chunks_exact(std::mem::size_of::<InstanceData>())
        .map(bytemuck::pod_read_unaligned::<InstanceData>)
        .collect()
}

fn perspective_camera() -> Arc<Camera> {
    let projection = Projection::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0).unwrap();
    Arc::new(Camera::new("main", projection).unwrap())
}

// ============================================================================
// Tests: MeshNode cloning
// ============================================================================

#[test]
fn test_clone_keeps_shared_skeleton_pose_shared() {
    let mut graph = SceneGraph::new();
    let mesh = skinned_mesh();
    let body = MeshNode::new(mesh.clone());
    let pose = body.skeleton_pose().unwrap().clone();
    let armor = MeshNode::new(mesh.clone()).with_skeleton_pose(pose.clone()).unwrap();

    let model = graph.create_node("model", ModelNode::new("character.glb"));
    let body = graph.create_node("body", body);
    let armor = graph.create_node("armor", armor);
    graph.add_child(model, body).unwrap();
    graph.add_child(model, armor).unwrap();

    let clone = graph.clone_subtree(model).unwrap();
    let children = graph.children(clone).unwrap().as_slice().to_vec();
    let body_pose = graph.data::<MeshNode>(children[0]).unwrap().skeleton_pose().unwrap().clone();
    let armor_pose = graph.data::<MeshNode>(children[1]).unwrap().skeleton_pose().unwrap().clone();

    // One pose for both cloned siblings, distinct from the original
    assert!(Arc::ptr_eq(&body_pose, &armor_pose));
    assert!(!Arc::ptr_eq(&body_pose, &pose));

    // Mesh stays shared
    let cloned_mesh = graph.data::<MeshNode>(children[0]).unwrap().mesh().unwrap().clone();
    assert!(Arc::ptr_eq(&cloned_mesh, &mesh));
    assert_eq!(graph.data::<ModelNode>(clone).unwrap().source(), "character.glb");
}

#[test]
fn test_cloned_skeleton_pose_is_independent() {
    let mut graph = SceneGraph::new();
    let key = graph.create_node("body", MeshNode::new(skinned_mesh()));
    let clone = graph.clone_subtree(key).unwrap();

    let moved = Pose::from_position(Vec3::new(0.0, -3.0, 0.0));
    let clone_pose = graph.data::<MeshNode>(clone).unwrap().skeleton_pose().unwrap().clone();
    clone_pose.lock().unwrap().set_bone_pose(1, moved).unwrap();

    let original = graph.data::<MeshNode>(key).unwrap().skeleton_pose().unwrap().clone();
    let knee = original.lock().unwrap().bone_pose(1).unwrap();
    assert_eq!(knee.position, Vec3::new(0.0, -1.0, 0.0));
}

#[test]
fn test_cloned_material_instances_are_independent() {
    let mut graph = SceneGraph::new();
    let key = graph.create_node("crate", MeshNode::new(static_mesh()));
    let clone = graph.clone_subtree(key).unwrap();

    graph.data_mut::<MeshNode>(clone).unwrap()
        .material_mut(0).unwrap()
        .set_param("roughness", ParamValue::Float(0.9)).unwrap();

    let original = graph.data::<MeshNode>(key).unwrap();
    assert!(!original.materials()[0].has_override("roughness"));
    let cloned = graph.data::<MeshNode>(clone).unwrap();
    assert!(Arc::ptr_eq(cloned.materials()[0].material(), original.materials()[0].material()));
}

#[test]
fn test_mesh_node_takes_mesh_shape() {
    let mut graph = SceneGraph::new();
    let key = graph.create_node("crate", MeshNode::new(static_mesh()));
    assert_eq!(graph.node(key).unwrap().shape(), Shape::Box { extent: Vec3::splat(2.0) });
}

#[test]
fn test_skeleton_pose_of_other_skeleton_rejected() {
    let other = SkeletonPose::new(skinned_mesh().skeleton().unwrap().clone());
    let result = MeshNode::new(skinned_mesh()).with_skeleton_pose(Arc::new(Mutex::new(other)));
    assert!(matches!(result, Err(Error::Configuration(_))));

    let unskinned = MeshNode::new(static_mesh())
        .with_skeleton_pose(MeshNode::new(skinned_mesh()).skeleton_pose().unwrap().clone());
    assert!(unskinned.is_err());
}

// ============================================================================
// Tests: MeshInstancingNode
// ============================================================================

#[test]
fn test_instancing_upload_writes_records() {
    let mut node = MeshInstancingNode::new(static_mesh());
    node.push_instance(MeshInstance::default());
    node.push_instance(MeshInstance {
        pose: Pose::from_position(Vec3::new(5.0, 0.0, 0.0)),
        scale: Vec3::ONE,
        color: Vec4::new(1.0, 0.0, 0.0, 1.0),
    });

    let buffer = MockBuffer::new(node.required_buffer_size());
    assert_eq!(node.upload(&buffer).unwrap(), 2);

    let records = read_records(&buffer);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].world[3], [5.0, 0.0, 0.0, 1.0]);
    assert_eq!(records[1].color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_instancing_upload_buffer_too_small() {
    let mut node = MeshInstancingNode::new(static_mesh());
    node.push_instance(MeshInstance::default());

    let buffer = MockBuffer::new(8);
    assert!(matches!(node.upload(&buffer), Err(Error::InvalidResource(_))));
}

#[test]
fn test_instancing_upload_concurrent() {
    let mut node = MeshInstancingNode::new(static_mesh());
    for i in 0..64 {
        node.push_instance(MeshInstance {
            pose: Pose::from_position(Vec3::new(i as f32, 0.0, 0.0)),
            ..MeshInstance::default()
        });
    }
    let node = Arc::new(node);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let node = node.clone();
            std::thread::spawn(move || {
                let buffer = MockBuffer::new(node.required_buffer_size());
                node.upload(&buffer).unwrap();
                read_records(&buffer)[63].world[3][0]
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 63.0);
    }
}

#[test]
fn test_instancing_bounds_cover_all_instances() {
    let mut graph = SceneGraph::new();
    let mut node = MeshInstancingNode::new(static_mesh());
    node.push_instance(MeshInstance::default());
    node.push_instance(MeshInstance {
        pose: Pose::from_position(Vec3::new(10.0, 0.0, 0.0)),
        ..MeshInstance::default()
    });
    let key = graph.create_node("forest", node);

    let aabb = graph.aabb(key).unwrap();
    assert!(aabb.min.abs_diff_eq(Vec3::splat(-1.0), 1e-5));
    assert!(aabb.max.abs_diff_eq(Vec3::new(11.0, 1.0, 1.0), 1e-5));

    graph.data_mut::<MeshInstancingNode>(key).unwrap().set_instances(Vec::new());
    graph.refresh_shape(key).unwrap();
    assert_eq!(graph.node(key).unwrap().shape(), Shape::Empty);
}

// ============================================================================
// Tests: Lights, decals, fog, terrain, particles
// ============================================================================

#[test]
fn test_light_shapes() {
    let mut graph = SceneGraph::new();
    let sun = graph.create_node("sun", LightNode::directional());
    let lamp = graph.create_node("lamp", LightNode::point(5.0).unwrap());
    let spot = graph.create_node("spot", LightNode::spot(8.0, 0.5).unwrap());

    assert_eq!(graph.node(sun).unwrap().shape(), Shape::Infinite);
    assert_eq!(graph.node(lamp).unwrap().shape(), Shape::Sphere { radius: 5.0 });
    assert_eq!(graph.node(spot).unwrap().shape(), Shape::Sphere { radius: 8.0 });
    assert!(graph.data::<LightNode>(sun).unwrap().is_directional());
    assert!(!graph.data::<LightNode>(lamp).unwrap().is_directional());
}

#[test]
fn test_light_invalid_parameters_rejected() {
    assert!(matches!(LightNode::point(0.0), Err(Error::Configuration(_))));
    assert!(LightNode::spot(5.0, 0.0).is_err());
    assert!(LightNode::spot(5.0, 2.0).is_err());
    assert!(LightNode::spot(-1.0, 0.5).is_err());
}

#[test]
fn test_decal_extent_is_shape() {
    let mut graph = SceneGraph::new();
    let decal = DecalNode::new(crate::resource::MaterialInstance::new(material()), Vec3::new(2.0, 2.0, 0.5)).unwrap();
    let key = graph.create_node("decal", decal);
    assert_eq!(graph.node(key).unwrap().shape(), Shape::Box { extent: Vec3::new(2.0, 2.0, 0.5) });

    let data = graph.data_mut::<DecalNode>(key).unwrap();
    assert!(data.set_extent(Vec3::new(1.0, 0.0, 1.0)).is_err());
    assert!(data.set_normal_threshold(1.5).is_err());
    data.set_extent(Vec3::splat(4.0)).unwrap();
    graph.refresh_shape(key).unwrap();
    assert_eq!(graph.node(key).unwrap().shape(), Shape::Box { extent: Vec3::splat(4.0) });
}

#[test]
fn test_fog_is_infinite() {
    let mut graph = SceneGraph::new();
    let key = graph.create_node("fog", FogNode::default());
    assert_eq!(graph.aabb(key).unwrap(), AABB::INFINITE);
    assert!(graph.data_mut::<FogNode>(key).unwrap().set_density(-0.1).is_err());
}

#[test]
fn test_terrain_bounds() {
    let terrain = TerrainNode::new(Vec2::new(100.0, 50.0), -2.0, 10.0).unwrap();
    assert_eq!(
        terrain.bounding_shape(),
        Some(Shape::Custom(AABB::new(Vec3::new(-50.0, -2.0, -25.0), Vec3::new(50.0, 10.0, 25.0))))
    );
    assert!(TerrainNode::new(Vec2::new(0.0, 1.0), 0.0, 1.0).is_err());
    assert!(TerrainNode::new(Vec2::ONE, 1.0, 0.0).is_err());
}

#[test]
fn test_particle_system_shared_on_clone() {
    let system = Arc::new(ParticleSystem::from_desc(ParticleSystemDesc {
        name: "sparks".to_string(),
        max_particles: 100,
        emission_rate: 10.0,
        lifetime: 2.0,
        bounds: Shape::Sphere { radius: 3.0 },
    }).unwrap());

    let mut graph = SceneGraph::new();
    let key = graph.create_node("sparks", ParticleSystemNode::new(system.clone()));
    let clone = graph.clone_subtree(key).unwrap();

    assert_eq!(graph.node(clone).unwrap().shape(), Shape::Sphere { radius: 3.0 });
    let cloned = graph.data::<ParticleSystemNode>(clone).unwrap().system().unwrap().clone();
    assert!(Arc::ptr_eq(&cloned, &system));
}

// ============================================================================
// Tests: CameraNode
// ============================================================================

#[test]
fn test_camera_view_snapshot() {
    let mut graph = SceneGraph::new();
    let mut camera = CameraNode::new(perspective_camera());
    camera.set_lod_bias(2.0).unwrap();
    let key = graph.create_node("camera", camera);
    graph.set_position_local(key, Vec3::new(0.0, 0.0, 10.0)).unwrap();

    let view = graph.camera_view(key).unwrap();
    assert!(view.position.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
    assert_eq!(view.lod_bias, 2.0);
    assert_eq!(view.near, 0.1);
    assert!(view.view.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    // No previous pose: last view equals view
    assert_eq!(view.last_view, view.view);
}

#[test]
fn test_camera_view_requires_camera_node() {
    let mut graph = SceneGraph::new();
    let group = graph.create_node("group", GroupNode);
    let empty = graph.create_node("empty", CameraNode::default());

    assert!(matches!(graph.camera_view(group), Err(Error::Configuration(_))));
    assert!(matches!(graph.camera_view(empty), Err(Error::Configuration(_))));
    assert!(CameraNode::default().set_lod_bias(0.0).is_err());
}

// ============================================================================
// Tests: LodGroupNode
// ============================================================================

fn lod_group(graph: &mut SceneGraph) -> (NodeKey, NodeKey, NodeKey, NodeKey) {
    let group = graph.create_node("lod", LodGroupNode::default());
    let high = graph.create_node("high", GroupNode);
    let medium = graph.create_node("medium", GroupNode);
    let low = graph.create_node("low", GroupNode);
    graph.set_shape(high, Shape::Box { extent: Vec3::splat(2.0) }).unwrap();
    graph.set_shape(low, Shape::Box { extent: Vec3::splat(1.0) }).unwrap();
    graph.set_position_local(low, Vec3::new(0.0, 5.0, 0.0)).unwrap();

    // Added out of order on purpose
    graph.add_lod_level(group, low, 50.0).unwrap();
    graph.add_lod_level(group, high, 0.0).unwrap();
    graph.add_lod_level(group, medium, 20.0).unwrap();
    (group, high, medium, low)
}

#[test]
fn test_lod_levels_sorted_and_proxied() {
    let mut graph = SceneGraph::new();
    let (group, high, medium, low) = lod_group(&mut graph);

    let lod = graph.data::<LodGroupNode>(group).unwrap();
    let order: Vec<NodeKey> = lod.levels().iter().map(|l| l.node).collect();
    assert_eq!(order, vec![high, medium, low]);
    for level in [high, medium, low] {
        assert_eq!(graph.node(level).unwrap().proxy(), Some(group));
        assert_eq!(graph.parent(level).unwrap(), Some(group));
    }
}

#[test]
fn test_lod_select_level() {
    let mut graph = SceneGraph::new();
    let (group, high, medium, low) = lod_group(&mut graph);
    let lod = graph.data::<LodGroupNode>(group).unwrap();

    assert_eq!(lod.select_level(0.0), Some(high));
    assert_eq!(lod.select_level(19.9), Some(high));
    assert_eq!(lod.select_level(20.0), Some(medium));
    assert_eq!(lod.select_level(1000.0), Some(low));
    assert_eq!(LodGroupNode::default().select_level(5.0), None);
}

#[test]
fn test_lod_select_before_first_distance_uses_first_level() {
    let mut graph = SceneGraph::new();
    let group = graph.create_node("lod", LodGroupNode::default());
    let far = graph.create_node("far", GroupNode);
    graph.add_lod_level(group, far, 10.0).unwrap();

    assert_eq!(graph.data::<LodGroupNode>(group).unwrap().select_level(1.0), Some(far));
}

#[test]
fn test_lod_group_shape_is_union_of_levels() {
    let mut graph = SceneGraph::new();
    let (group, _high, _medium, _low) = lod_group(&mut graph);

    let expected = AABB::new(Vec3::splat(-1.0), Vec3::new(1.0, 5.5, 1.0));
    assert_eq!(graph.node(group).unwrap().shape(), Shape::Custom(expected));
    assert!(!graph.data::<LodGroupNode>(group).unwrap().is_bounds_stale());
}

#[test]
fn test_lod_bounds_go_stale_on_level_change() {
    let mut graph = SceneGraph::new();
    let (group, high, _medium, _low) = lod_group(&mut graph);

    graph.set_scale_local(high, Vec3::splat(4.0)).unwrap();
    assert!(graph.data::<LodGroupNode>(group).unwrap().is_bounds_stale());

    graph.refresh_lod_bounds(group).unwrap();
    let Shape::Custom(bounds) = graph.node(group).unwrap().shape() else {
        panic!("expected custom shape");
    };
    assert!(bounds.min.abs_diff_eq(Vec3::splat(-4.0), 1e-5));
}

#[test]
fn test_lod_remove_level() {
    let mut graph = SceneGraph::new();
    let (group, high, _medium, _low) = lod_group(&mut graph);

    assert!(graph.remove_lod_level(group, high).unwrap());
    assert!(!graph.remove_lod_level(group, high).unwrap());
    assert_eq!(graph.data::<LodGroupNode>(group).unwrap().level_count(), 2);
    assert_eq!(graph.node(high).unwrap().proxy(), None);
    assert_eq!(graph.parent(high).unwrap(), None);
}

#[test]
fn test_lod_invalid_distance_and_group() {
    let mut graph = SceneGraph::new();
    let group = graph.create_node("lod", LodGroupNode::default());
    let plain = graph.create_node("plain", GroupNode);
    let level = graph.create_node("level", GroupNode);

    assert!(matches!(graph.add_lod_level(group, level, -1.0), Err(Error::Configuration(_))));
    assert!(matches!(graph.add_lod_level(plain, level, 1.0), Err(Error::InvariantViolation(_))));
    assert_eq!(graph.parent(level).unwrap(), None);
}

#[test]
fn test_lod_clone_remaps_levels() {
    let mut graph = SceneGraph::new();
    let (group, high, _medium, _low) = lod_group(&mut graph);

    let clone = graph.clone_subtree(group).unwrap();
    let lod = graph.data::<LodGroupNode>(clone).unwrap();
    let first = lod.levels()[0].node;

    assert_ne!(first, high);
    assert_eq!(graph.parent(first).unwrap(), Some(clone));
    assert_eq!(graph.node(first).unwrap().proxy(), Some(clone));
    assert_eq!(graph.node(first).unwrap().name(), "high");
}

#[test]
fn test_cloned_lod_level_drops_outside_proxy() {
    let mut graph = SceneGraph::new();
    let (group, high, _medium, _low) = lod_group(&mut graph);

    let clone = graph.clone_subtree(high).unwrap();
    assert_eq!(graph.node(clone).unwrap().proxy(), None);
    assert_eq!(graph.node(high).unwrap().proxy(), Some(group));
    assert!(graph.data::<LodGroupNode>(group).unwrap().levels().iter().all(|l| l.node != clone));
}
