/// Node kinds and the two-step clone protocol.
///
/// Every scene node carries a `Box<dyn NodeData>` with the data of its
/// concrete kind (mesh, camera, light, ...). Cloning a node first asks the
/// source data for a blank instance of the same kind (`create_blank`),
/// then copies the source into it (`copy_from`). Implementations decide
/// per field whether data is shared (`Arc` clone) or duplicated.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::math::Shape;
use super::{NodeKey, SceneChangedEvent};

/// Data of a concrete node kind
pub trait NodeData: Any + Send {
    /// Kind name used in logs and error messages
    fn type_name(&self) -> &'static str;

    /// New instance of the same concrete kind, in its default state
    fn create_blank(&self) -> Box<dyn NodeData>;

    /// Copy the state of `source` (same concrete kind) into `self`
    fn copy_from(&mut self, source: &dyn NodeData, context: &mut CloneContext) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Bounding shape implied by the data, applied when the node is
    /// created or when `SceneGraph::refresh_shape` is called
    fn bounding_shape(&self) -> Option<Shape> {
        None
    }

    /// Called for changes of this node and of any descendant
    fn on_scene_changed(&mut self, _event: &SceneChangedEvent) {}

    /// Rewrite node keys held by the data after a subtree clone
    fn remap_node_keys(&mut self, _map: &FxHashMap<NodeKey, NodeKey>) {}
}

/// Implements the kind-independent part of `NodeData` for a `Default` type
macro_rules! node_data_common {
    ($ty:ident) => {
        fn type_name(&self) -> &'static str {
            stringify!($ty)
        }

        fn create_blank(&self) -> Box<dyn $crate::scene::NodeData> {
            Box::new($ty::default())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
pub(crate) use node_data_common;

/// Downcast the source of a `copy_from` call to the expected kind
///
/// # Errors
///
/// `Error::InvariantViolation` if `source` is of another kind.
pub fn downcast_source<'a, T: NodeData>(source: &'a dyn NodeData, expected: &str) -> Result<&'a T> {
    match source.as_any().downcast_ref::<T>() {
        Some(source) => Ok(source),
        None => engine_bail!(InvariantViolation, "galaxy3d::NodeData",
            "Cannot copy a {} into a {}", source.type_name(), expected),
    }
}

/// Whether two node data objects are of the same concrete kind
pub(crate) fn same_kind(a: &dyn NodeData, b: &dyn NodeData) -> bool {
    a.as_any().type_id() == b.as_any().type_id()
}

// ===== CLONE CONTEXT =====

/// State shared by all `copy_from` calls of one subtree clone.
///
/// Maps original node keys to their clones and keeps shared instance data
/// shared: two original nodes referencing the same `Arc<Mutex<T>>` get
/// clones that reference the same (single) cloned value.
#[derive(Default)]
pub struct CloneContext {
    key_map: FxHashMap<NodeKey, NodeKey>,
    shared: FxHashMap<(usize, TypeId), Box<dyn Any + Send>>,
}

impl CloneContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of an original node, once it has been created
    pub fn map_key(&self, original: NodeKey) -> Option<NodeKey> {
        self.key_map.get(&original).copied()
    }

    /// Original to clone mapping for every node cloned so far
    pub fn key_map(&self) -> &FxHashMap<NodeKey, NodeKey> {
        &self.key_map
    }

    pub(crate) fn record_key(&mut self, original: NodeKey, clone: NodeKey) {
        self.key_map.insert(original, clone);
    }

    /// Clone shared instance data exactly once per original object
    ///
    /// # Errors
    ///
    /// `Error::BackendError` if the original's lock is poisoned.
    pub fn clone_shared<T: Clone + Send + 'static>(&mut self, original: &Arc<Mutex<T>>) -> Result<Arc<Mutex<T>>> {
        let identity = (Arc::as_ptr(original) as *const () as usize, TypeId::of::<T>());
        if let Some(existing) = self.shared.get(&identity).and_then(|s| s.downcast_ref::<Arc<Mutex<T>>>()) {
            return Ok(existing.clone());
        }

        let value = match original.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => engine_bail!("galaxy3d::CloneContext", "Shared data lock poisoned"),
        };
        let cloned = Arc::new(Mutex::new(value));
        self.shared.insert(identity, Box::new(cloned.clone()));
        Ok(cloned)
    }
}
