/// ViewDependentCache: per-camera data keyed by scene node.
///
/// Renderers attach data computed for one (camera, node) pair, such as
/// occlusion results or LOD blend state. The cache is owned by the
/// `Scene`; disposing a node calls `invalidate_node`, which drops every
/// entry that references it so no data outlives its node.

use std::any::{Any, TypeId};
use rustc_hash::FxHashMap;
use crate::engine_trace;
use crate::scene::NodeKey;

type Entries = FxHashMap<(NodeKey, TypeId), Box<dyn Any + Send>>;

#[derive(Default)]
pub struct ViewDependentCache {
    cameras: FxHashMap<NodeKey, Entries>,
}

impl ViewDependentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a camera node (no-op if already registered)
    pub fn register_camera(&mut self, camera: NodeKey) {
        self.cameras.entry(camera).or_default();
    }

    /// Stop tracking a camera node and drop its data
    pub fn unregister_camera(&mut self, camera: NodeKey) -> bool {
        self.cameras.remove(&camera).is_some()
    }

    pub fn is_registered(&self, camera: NodeKey) -> bool {
        self.cameras.contains_key(&camera)
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Store data for `(camera, node)`, registering the camera if needed.
    /// Returns the previous value of the same type, if any.
    pub fn insert<T: Any + Send>(&mut self, camera: NodeKey, node: NodeKey, value: T) -> Option<Box<dyn Any + Send>> {
        self.cameras
            .entry(camera)
            .or_default()
            .insert((node, TypeId::of::<T>()), Box::new(value))
    }

    pub fn get<T: Any + Send>(&self, camera: NodeKey, node: NodeKey) -> Option<&T> {
        self.cameras.get(&camera)?.get(&(node, TypeId::of::<T>()))?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any + Send>(&mut self, camera: NodeKey, node: NodeKey) -> Option<&mut T> {
        self.cameras.get_mut(&camera)?.get_mut(&(node, TypeId::of::<T>()))?.downcast_mut::<T>()
    }

    /// Number of entries stored for a camera
    pub fn entry_count(&self, camera: NodeKey) -> usize {
        self.cameras.get(&camera).map_or(0, |e| e.len())
    }

    /// Drop everything that references `node`, as camera or as subject
    pub fn invalidate_node(&mut self, node: NodeKey) {
        let was_camera = self.cameras.remove(&node).is_some();
        let mut dropped = 0;
        for entries in self.cameras.values_mut() {
            let before = entries.len();
            entries.retain(|(key, _), _| *key != node);
            dropped += before - entries.len();
        }
        if was_camera || dropped > 0 {
            engine_trace!("galaxy3d::ViewDependentCache",
                "Invalidated {:?} (camera: {}, entries: {})", node, was_camera, dropped);
        }
    }

    /// Drop every camera and entry whose node fails `alive`.
    /// Returns the number of dropped entries (cameras included).
    pub fn retain_nodes(&mut self, mut alive: impl FnMut(NodeKey) -> bool) -> usize {
        let before = self.cameras.len();
        self.cameras.retain(|camera, _| alive(*camera));
        let mut dropped = before - self.cameras.len();
        for entries in self.cameras.values_mut() {
            let count = entries.len();
            entries.retain(|(key, _), _| alive(*key));
            dropped += count - entries.len();
        }
        dropped
    }

    /// Drop all data of every camera, keeping registrations
    pub fn clear_data(&mut self) {
        for entries in self.cameras.values_mut() {
            entries.clear();
        }
    }
}

#[cfg(test)]
#[path = "view_dependent_cache_tests.rs"]
mod tests;
