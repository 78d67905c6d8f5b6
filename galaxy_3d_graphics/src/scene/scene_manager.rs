//! Central scene manager.
//!
//! Stores named scenes. Scenes are shared as `Arc<Mutex<Scene>>` so a
//! render thread and an update thread can each hold one.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use super::scene::Scene;

pub struct SceneManager {
    scenes: FxHashMap<String, Arc<Mutex<Scene>>>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self {
            scenes: FxHashMap::default(),
        }
    }

    /// Create a new named scene
    ///
    /// # Errors
    ///
    /// Returns an error if a scene with the same name already exists.
    pub fn create_scene(&mut self, name: &str) -> Result<Arc<Mutex<Scene>>> {
        if self.scenes.contains_key(name) {
            engine_bail!(Configuration, "galaxy3d::SceneManager",
                "Scene '{}' already exists", name);
        }

        let scene = Arc::new(Mutex::new(Scene::new(name)));
        self.scenes.insert(name.to_string(), Arc::clone(&scene));
        Ok(scene)
    }

    /// Get a scene by name
    pub fn scene(&self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        self.scenes.get(name).cloned()
    }

    /// Remove a scene by name
    ///
    /// Returns the removed scene, or None if not found. Other holders of
    /// the `Arc` keep the scene alive.
    pub fn remove_scene(&mut self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        self.scenes.remove(name)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Names of all scenes (unordered)
    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.keys().map(|k| k.as_str()).collect()
    }

    /// Remove all scenes
    pub fn clear(&mut self) {
        self.scenes.clear();
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
