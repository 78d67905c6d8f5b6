use slotmap::SlotMap;
use crate::scene::NodeKey;
use super::*;

fn keys(n: usize) -> Vec<NodeKey> {
    let mut map: SlotMap<NodeKey, ()> = SlotMap::with_key();
    (0..n).map(|_| map.insert(())).collect()
}

#[derive(Debug, PartialEq)]
struct Occlusion(bool);

#[test]
fn test_insert_and_get_by_type() {
    let k = keys(2);
    let (camera, node) = (k[0], k[1]);
    let mut cache = ViewDependentCache::new();

    cache.insert(camera, node, Occlusion(true));
    cache.insert(camera, node, 3u32);

    assert!(cache.is_registered(camera));
    assert_eq!(cache.get::<Occlusion>(camera, node), Some(&Occlusion(true)));
    assert_eq!(cache.get::<u32>(camera, node), Some(&3));
    assert_eq!(cache.get::<f32>(camera, node), None);
    assert_eq!(cache.entry_count(camera), 2);

    *cache.get_mut::<u32>(camera, node).unwrap() += 1;
    assert_eq!(cache.get::<u32>(camera, node), Some(&4));
}

#[test]
fn test_invalidate_node_drops_entries_in_every_camera() {
    let k = keys(3);
    let (cam_a, cam_b, node) = (k[0], k[1], k[2]);
    let mut cache = ViewDependentCache::new();

    cache.insert(cam_a, node, 1u32);
    cache.insert(cam_b, node, 2u32);
    cache.insert(cam_b, cam_a, 3u32);

    cache.invalidate_node(node);
    assert_eq!(cache.entry_count(cam_a), 0);
    assert_eq!(cache.entry_count(cam_b), 1);

    // Invalidating a camera removes its registration and data about it
    cache.invalidate_node(cam_a);
    assert!(!cache.is_registered(cam_a));
    assert_eq!(cache.entry_count(cam_b), 0);
    assert_eq!(cache.camera_count(), 1);
}

#[test]
fn test_register_unregister() {
    let k = keys(1);
    let mut cache = ViewDependentCache::new();
    cache.register_camera(k[0]);
    cache.register_camera(k[0]);
    assert_eq!(cache.camera_count(), 1);
    assert!(cache.unregister_camera(k[0]));
    assert!(!cache.unregister_camera(k[0]));
}

#[test]
fn test_clear_data_keeps_registrations() {
    let k = keys(2);
    let mut cache = ViewDependentCache::new();
    cache.insert(k[0], k[1], 1u8);
    cache.clear_data();
    assert!(cache.is_registered(k[0]));
    assert_eq!(cache.entry_count(k[0]), 0);
}

#[test]
fn test_retain_nodes_drops_dead_cameras_and_subjects() {
    let k = keys(4);
    let (cam_a, cam_b, live, dead) = (k[0], k[1], k[2], k[3]);
    let mut cache = ViewDependentCache::new();

    cache.insert(cam_a, live, 1u32);
    cache.insert(cam_a, dead, 2u32);
    cache.insert(cam_b, live, 3u32);

    let dropped = cache.retain_nodes(|key| key != dead && key != cam_b);
    assert_eq!(dropped, 2);
    assert!(!cache.is_registered(cam_b));
    assert_eq!(cache.entry_count(cam_a), 1);
    assert_eq!(cache.get::<u32>(cam_a, live), Some(&1));
}
