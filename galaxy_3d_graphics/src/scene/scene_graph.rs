/// SceneGraph: arena of scene nodes with lazy transform propagation.
///
/// Nodes live in a `SlotMap` and reference each other by `NodeKey`.
/// A key whose node has been disposed is rejected with
/// `Error::NodeDisposed` by every operation.
///
/// # World transforms
///
/// - World pose: `parent_pose * (local.position * parent_scale, local.orientation)`
/// - World scale with a uniform parent scale: `parent_scale * local_scale`
/// - World scale with a non-uniform parent scale: the diagonal of
///   `R^T * S_parent * R` (R = local rotation) times the local scale. This
///   assumes no shearing: a rotated child under a non-uniformly scaled
///   parent gets the parent scale projected onto its own axes.
///
/// Any pose or scale mutation marks the world caches of the whole subtree
/// stale; they are recomputed on the next read, at most once per mutation.

use std::cell::Cell;
use glam::{Mat3, Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::Result;
use crate::math::{Pose, Shape, AABB, EPSILON};
use crate::{engine_bail, engine_err, engine_trace};
use super::node::Cached;
use super::node_data::same_kind;
use super::{
    CloneContext, NodeData, NodeFlags, NodeKey, SceneChangedEvent, SceneChanges,
    SceneNode, SceneNodeCollection,
};

/// Number of lazy recomputations since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub pose_world_updates: u64,
    pub scale_world_updates: u64,
    pub aabb_updates: u64,
}

pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    events: Vec<SceneChangedEvent>,
    stats: Cell<TransformStats>,
    revision: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn is_uniform(scale: Vec3) -> bool {
    (scale.x - scale.y).abs() <= EPSILON && (scale.x - scale.z).abs() <= EPSILON
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            events: Vec::new(),
            stats: Cell::new(TransformStats::default()),
            revision: 0,
        }
    }

    // ===== NODE LIFETIME =====

    /// Create a detached node
    pub fn create_node<D: NodeData>(&mut self, name: &str, data: D) -> NodeKey {
        self.create_node_boxed(name, Box::new(data))
    }

    /// Create a detached node from boxed data
    pub fn create_node_boxed(&mut self, name: &str, data: Box<dyn NodeData>) -> NodeKey {
        let key = self.nodes.insert(SceneNode::new(name.to_string(), data));
        self.revision += 1;
        engine_trace!("galaxy3d::SceneGraph", "Created node '{}' {:?}", name, key);
        key
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.keys()
    }

    /// Incremented by every structural or transform mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, key: NodeKey) -> Result<&SceneNode> {
        match self.nodes.get(key) {
            Some(node) => Ok(node),
            None => engine_bail!(NodeDisposed, "galaxy3d::SceneGraph", "Node {:?} does not exist", key),
        }
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode> {
        match self.nodes.get_mut(key) {
            Some(node) => Ok(node),
            None => engine_bail!(NodeDisposed, "galaxy3d::SceneGraph", "Node {:?} does not exist", key),
        }
    }

    /// Data of a node, downcast to its concrete kind
    ///
    /// # Errors
    ///
    /// `Error::NodeDisposed` for a stale key, `Error::InvariantViolation`
    /// if the node is of another kind.
    pub fn data<T: NodeData>(&self, key: NodeKey) -> Result<&T> {
        let node = self.node(key)?;
        match node.data.as_any().downcast_ref::<T>() {
            Some(data) => Ok(data),
            None => engine_bail!(InvariantViolation, "galaxy3d::SceneGraph",
                "Node '{}' is a {}", node.name, node.data.type_name()),
        }
    }

    /// Mutable data of a node, downcast to its concrete kind.
    ///
    /// Data changes that affect bounds must be followed by `refresh_shape`.
    pub fn data_mut<T: NodeData>(&mut self, key: NodeKey) -> Result<&mut T> {
        self.revision += 1;
        let node = self.node_mut(key)?;
        if !node.data.as_any().is::<T>() {
            engine_bail!(InvariantViolation, "galaxy3d::SceneGraph",
                "Node '{}' is a {}", node.name, node.data.type_name());
        }
        match node.data.as_any_mut().downcast_mut::<T>() {
            Some(data) => Ok(data),
            None => engine_bail!("galaxy3d::SceneGraph", "Node data downcast failed"),
        }
    }

    /// Dispose a node and its whole subtree.
    ///
    /// Detaches the node from its parent and clears proxies pointing into
    /// the subtree. Disposing a key that no longer exists is a no-op.
    /// Returns the keys that were removed. Scenes dispose through
    /// `Scene::dispose_node`, which also unregisters view-dependent data.
    pub(crate) fn dispose(&mut self, key: NodeKey) -> Result<Vec<NodeKey>> {
        if !self.contains(key) {
            return Ok(Vec::new());
        }

        if let Some(parent) = self.node(key)?.parent {
            self.detach(parent, key)?;
        }

        let mut removed = vec![key];
        removed.extend(self.descendants(key)?);
        for k in &removed {
            self.nodes.remove(*k);
        }
        for node in self.nodes.values_mut() {
            if node.proxy.is_some_and(|p| removed.contains(&p)) {
                node.proxy = None;
            }
        }
        self.revision += 1;
        engine_trace!("galaxy3d::SceneGraph", "Disposed {} nodes from {:?}", removed.len(), key);
        Ok(removed)
    }

    // ===== HIERARCHY =====

    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        Ok(self.node(key)?.parent)
    }

    pub fn children(&self, key: NodeKey) -> Result<&SceneNodeCollection> {
        Ok(&self.node(key)?.children)
    }

    /// Append `child` to the children of `parent`
    ///
    /// # Errors
    ///
    /// `Error::InvariantViolation` if `child` already has a parent, or if
    /// the link would create a cycle.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` in the children of `parent`
    pub fn insert_child(&mut self, parent: NodeKey, index: usize, child: NodeKey) -> Result<()> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if let Some(owner) = child_node.parent {
            engine_bail!(InvariantViolation, "galaxy3d::SceneGraph",
                "Node '{}' already has parent {:?}; remove it first", child_node.name, owner);
        }
        if parent == child || self.is_ancestor_of(child, parent)? {
            engine_bail!(InvariantViolation, "galaxy3d::SceneGraph",
                "Adding '{}' under {:?} would create a cycle", child_node.name, parent);
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.invalidate_subtree(child)?;
        self.revision += 1;
        self.notify(child, SceneChanges::NODE_ADDED)?;
        Ok(())
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<bool> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Ok(false);
        }
        self.detach(parent, child)?;
        Ok(true)
    }

    /// Detach every child of `key`, returning them in order
    pub fn clear_children(&mut self, key: NodeKey) -> Result<Vec<NodeKey>> {
        let children: Vec<NodeKey> = self.node(key)?.children.iter().collect();
        for child in &children {
            self.detach(key, *child)?;
        }
        Ok(children)
    }

    fn detach(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        // Ancestors hear about the removal while the link still exists
        self.notify(child, SceneChanges::NODE_REMOVED)?;
        self.node_mut(parent)?.children.remove(child);
        self.node_mut(child)?.parent = None;
        self.invalidate_subtree(child)?;
        self.revision += 1;
        Ok(())
    }

    /// Link a freshly cloned child without notifications
    fn attach_clone(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Whether `ancestor` is a strict ancestor of `key`
    pub fn is_ancestor_of(&self, ancestor: NodeKey, key: NodeKey) -> Result<bool> {
        let mut current = self.node(key)?.parent;
        while let Some(k) = current {
            if k == ancestor {
                return Ok(true);
            }
            current = self.node(k)?.parent;
        }
        Ok(false)
    }

    /// Ancestors of `key`, nearest first
    pub fn ancestors(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        let mut result = Vec::new();
        let mut current = self.node(key)?.parent;
        while let Some(k) = current {
            result.push(k);
            current = self.node(k)?.parent;
        }
        Ok(result)
    }

    /// All nodes below `key`, depth-first pre-order (excluding `key`)
    pub fn descendants(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeKey> = self.node(key)?.children.iter().rev().collect();
        while let Some(k) = stack.pop() {
            result.push(k);
            stack.extend(self.node(k)?.children.iter().rev());
        }
        Ok(result)
    }

    /// Root of the tree containing `key`
    pub fn root_of(&self, key: NodeKey) -> Result<NodeKey> {
        Ok(self.ancestors(key)?.last().copied().unwrap_or(key))
    }

    // ===== FLAGS =====

    pub fn set_name(&mut self, key: NodeKey, name: &str) -> Result<()> {
        self.node_mut(key)?.name = name.to_string();
        Ok(())
    }

    /// Set or clear flags
    pub fn set_flags(&mut self, key: NodeKey, flags: NodeFlags, value: bool) -> Result<()> {
        self.node_mut(key)?.flags.set(flags, value);
        self.revision += 1;
        Ok(())
    }

    pub fn set_enabled(&mut self, key: NodeKey, enabled: bool) -> Result<()> {
        self.set_flags(key, NodeFlags::ENABLED, enabled)
    }

    /// Enabled state of the node combined with all its ancestors
    pub fn actual_is_enabled(&self, key: NodeKey) -> Result<bool> {
        let mut current = Some(key);
        while let Some(k) = current {
            let node = self.node(k)?;
            if !node.is_enabled() {
                return Ok(false);
            }
            current = node.parent;
        }
        Ok(true)
    }

    pub fn set_user_flags(&mut self, key: NodeKey, user_flags: u16) -> Result<()> {
        self.node_mut(key)?.user_flags = user_flags;
        Ok(())
    }

    /// Set the view-normalized culling distance (0 disables culling)
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for a negative or NaN distance.
    pub fn set_max_distance(&mut self, key: NodeKey, distance: f32) -> Result<()> {
        if !(distance >= 0.0) {
            engine_bail!(Configuration, "galaxy3d::SceneGraph",
                "max_distance must be >= 0 (got {})", distance);
        }
        self.node_mut(key)?.max_distance = distance;
        self.revision += 1;
        Ok(())
    }

    /// Set the node representing `key` in scene queries
    pub fn set_proxy(&mut self, key: NodeKey, proxy: Option<NodeKey>) -> Result<()> {
        if let Some(p) = proxy {
            self.node(p)?;
        }
        self.node_mut(key)?.proxy = proxy;
        self.revision += 1;
        Ok(())
    }

    // ===== LOCAL TRANSFORMS =====

    /// Set the pose relative to the parent
    ///
    /// # Errors
    ///
    /// `Error::DegenerateInput` for non-finite components.
    pub fn set_pose_local(&mut self, key: NodeKey, pose: Pose) -> Result<()> {
        if !pose.is_finite() {
            engine_bail!(DegenerateInput, "galaxy3d::SceneGraph", "Non-finite pose {:?}", pose);
        }
        let pose = Pose::new(pose.position, pose.orientation.normalize());
        let node = self.node(key)?;
        let rotated = node.pose_local.orientation != pose.orientation;
        let parent = node.parent;

        // Rotating under a non-uniform parent scale changes the world scale
        let mut changes = SceneChanges::POSE_CHANGED;
        if rotated {
            if let Some(parent) = parent {
                if !is_uniform(self.scale_world(parent)?) {
                    changes |= SceneChanges::SHAPE_CHANGED;
                }
            }
        }

        self.node_mut(key)?.pose_local = pose;
        self.invalidate_subtree(key)?;
        self.revision += 1;
        self.notify(key, changes)
    }

    pub fn set_position_local(&mut self, key: NodeKey, position: Vec3) -> Result<()> {
        let orientation = self.node(key)?.pose_local.orientation;
        self.set_pose_local(key, Pose::new(position, orientation))
    }

    pub fn set_orientation_local(&mut self, key: NodeKey, orientation: Quat) -> Result<()> {
        let position = self.node(key)?.pose_local.position;
        self.set_pose_local(key, Pose::new(position, orientation))
    }

    /// Set the scale relative to the parent
    ///
    /// # Errors
    ///
    /// `Error::DegenerateInput` for non-finite components.
    pub fn set_scale_local(&mut self, key: NodeKey, scale: Vec3) -> Result<()> {
        if !scale.is_finite() {
            engine_bail!(DegenerateInput, "galaxy3d::SceneGraph", "Non-finite scale {:?}", scale);
        }
        self.node_mut(key)?.scale_local = scale;
        self.invalidate_subtree(key)?;
        self.revision += 1;
        self.notify(key, SceneChanges::SHAPE_CHANGED)
    }

    /// Replace the bounding shape
    pub fn set_shape(&mut self, key: NodeKey, shape: Shape) -> Result<()> {
        let node = self.node_mut(key)?;
        node.shape = shape;
        node.aabb.set(Cached::Stale);
        self.revision += 1;
        self.notify(key, SceneChanges::SHAPE_CHANGED)
    }

    /// Re-apply the shape implied by the node data (`NodeData::bounding_shape`)
    pub fn refresh_shape(&mut self, key: NodeKey) -> Result<()> {
        match self.node(key)?.data.bounding_shape() {
            Some(shape) => self.set_shape(key, shape),
            None => Ok(()),
        }
    }

    // ===== WORLD TRANSFORMS =====

    fn bump_stats(&self, f: impl FnOnce(&mut TransformStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    /// Pose in world space (recomputed lazily)
    pub fn pose_world(&self, key: NodeKey) -> Result<Pose> {
        let node = self.node(key)?;
        if let Some(pose) = node.pose_world.get().get() {
            return Ok(pose);
        }

        let pose = match node.parent {
            None => node.pose_local,
            Some(parent) => {
                let parent_pose = self.pose_world(parent)?;
                let parent_scale = self.scale_world(parent)?;
                parent_pose * Pose::new(node.pose_local.position * parent_scale, node.pose_local.orientation)
            }
        };
        node.pose_world.set(Cached::Valid(pose));
        self.bump_stats(|s| s.pose_world_updates += 1);
        Ok(pose)
    }

    /// Scale in world space (recomputed lazily)
    pub fn scale_world(&self, key: NodeKey) -> Result<Vec3> {
        let node = self.node(key)?;
        if let Some(scale) = node.scale_world.get().get() {
            return Ok(scale);
        }

        let scale = match node.parent {
            None => node.scale_local,
            Some(parent) => {
                let parent_scale = self.scale_world(parent)?;
                if is_uniform(parent_scale) {
                    parent_scale * node.scale_local
                } else {
                    let r = Mat3::from_quat(node.pose_local.orientation);
                    let m = r.transpose() * Mat3::from_diagonal(parent_scale) * r;
                    Vec3::new(m.x_axis.x, m.y_axis.y, m.z_axis.z) * node.scale_local
                }
            }
        };
        node.scale_world.set(Cached::Valid(scale));
        self.bump_stats(|s| s.scale_world_updates += 1);
        Ok(scale)
    }

    /// World-space bounding box (recomputed lazily; `Infinite` shapes
    /// return `AABB::INFINITE` without any computation)
    pub fn aabb(&self, key: NodeKey) -> Result<AABB> {
        let node = self.node(key)?;
        if node.shape.is_infinite() {
            return Ok(AABB::INFINITE);
        }
        if let Some(aabb) = node.aabb.get().get() {
            return Ok(aabb);
        }

        let aabb = node.shape.aabb(self.scale_world(key)?, &self.pose_world(key)?);
        node.aabb.set(Cached::Valid(aabb));
        self.bump_stats(|s| s.aabb_updates += 1);
        Ok(aabb)
    }

    /// Set the world pose by computing the equivalent local pose against
    /// the current parent world transform
    ///
    /// # Errors
    ///
    /// `Error::DegenerateInput` if the parent world scale has a zero
    /// component or the pose is not finite.
    pub fn set_pose_world(&mut self, key: NodeKey, pose: Pose) -> Result<()> {
        let local = match self.node(key)?.parent {
            None => pose,
            Some(parent) => {
                let parent_pose = self.pose_world(parent)?;
                let parent_scale = self.scale_world(parent)?;
                if parent_scale.abs().min_element() <= EPSILON {
                    engine_bail!(DegenerateInput, "galaxy3d::SceneGraph",
                        "Cannot set world pose under a zero parent scale {:?}", parent_scale);
                }
                let relative = parent_pose.inverse() * pose;
                Pose::new(relative.position / parent_scale, relative.orientation)
            }
        };
        self.set_pose_local(key, local)
    }

    /// Orient the node so that its forward axis (-Z) points at `target`
    pub fn look_at(&mut self, key: NodeKey, target: Vec3, up: Vec3) -> Result<()> {
        let position = self.pose_world(key)?.position;
        let pose = Pose::look_at(position, target, up)?;
        self.set_pose_world(key, pose)
    }

    /// Set the previous-frame world transforms explicitly
    pub fn set_last_transforms(&mut self, key: NodeKey, pose: Option<Pose>, scale: Option<Vec3>) -> Result<()> {
        let node = self.node_mut(key)?;
        node.last_pose_world = pose;
        node.last_scale_world = scale;
        Ok(())
    }

    /// Copy the current world transforms of the subtree into the
    /// previous-frame slots (used for motion vectors)
    pub fn store_last_transforms(&mut self, key: NodeKey) -> Result<()> {
        let mut keys = vec![key];
        keys.extend(self.descendants(key)?);
        for k in keys {
            let pose = self.pose_world(k)?;
            let scale = self.scale_world(k)?;
            let node = self.node_mut(k)?;
            node.last_pose_world = Some(pose);
            node.last_scale_world = Some(scale);
        }
        Ok(())
    }

    fn invalidate_subtree(&mut self, key: NodeKey) -> Result<()> {
        let node = self.node(key)?;
        node.invalidate_world();
        let mut stack: Vec<NodeKey> = node.children.iter().collect();
        while let Some(k) = stack.pop() {
            let child = self.node(k)?;
            // A node with stale transforms only has stale descendants
            if child.invalidate_world() {
                stack.extend(child.children.iter());
            }
        }
        Ok(())
    }

    // ===== EVENTS =====

    /// Deliver a change to `source` and all its ancestors and queue it
    fn notify(&mut self, source: NodeKey, changes: SceneChanges) -> Result<()> {
        let event = SceneChangedEvent { source, changes };
        let mut current = Some(source);
        while let Some(k) = current {
            let node = self.node_mut(k)?;
            node.data.on_scene_changed(&event);
            current = node.parent;
        }

        match self.events.last_mut() {
            Some(last) if last.source == source => last.changes |= changes,
            _ => self.events.push(event),
        }
        engine_trace!("galaxy3d::SceneGraph", "{:?} on {:?}", changes, source);
        Ok(())
    }

    /// Drain queued scene changes (consecutive changes of the same node
    /// are merged)
    pub fn take_scene_changes(&mut self) -> Vec<SceneChangedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> TransformStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(TransformStats::default());
    }

    // ===== CLONING =====

    /// Deep-copy the subtree rooted at `key`.
    ///
    /// The clone is detached. Node data decides what is shared and what
    /// is duplicated (`NodeData::copy_from`); proxies and node keys held
    /// by data are remapped to the cloned nodes, and proxies pointing
    /// outside the subtree are cleared.
    ///
    /// # Errors
    ///
    /// `Error::InvariantViolation` if a node kind's `create_blank` returns
    /// another kind. No partial clone is left behind on error.
    pub fn clone_subtree(&mut self, key: NodeKey) -> Result<NodeKey> {
        let mut context = CloneContext::new();
        let result = self.clone_recursive(key, &mut context);

        let root = match result {
            Ok(root) => root,
            Err(err) => {
                let created: Vec<NodeKey> = context.key_map().values().copied().collect();
                for k in created {
                    self.nodes.remove(k);
                }
                return Err(err);
            }
        };

        let map: FxHashMap<NodeKey, NodeKey> = context.key_map().clone();
        for clone in map.values() {
            let node = self.node_mut(*clone)?;
            // A proxy outside the cloned subtree does not know the clone
            node.proxy = node.proxy.and_then(|proxy| map.get(&proxy).copied());
            node.data.remap_node_keys(&map);
        }
        self.revision += 1;
        engine_trace!("galaxy3d::SceneGraph", "Cloned {} nodes from {:?}", map.len(), key);
        Ok(root)
    }

    fn clone_recursive(&mut self, key: NodeKey, context: &mut CloneContext) -> Result<NodeKey> {
        let source = self.node(key)?;
        let mut data = source.data.create_blank();
        if !same_kind(data.as_ref(), source.data.as_ref()) {
            return Err(engine_err!(InvariantViolation, "galaxy3d::SceneGraph",
                "create_blank of {} returned a {}", source.data.type_name(), data.type_name()));
        }
        data.copy_from(source.data.as_ref(), context)?;

        let node = source.clone_base(data);
        let children: Vec<NodeKey> = source.children.iter().collect();
        let clone = self.nodes.insert(node);
        context.record_key(key, clone);

        for child in children {
            let child_clone = self.clone_recursive(child, context)?;
            self.attach_clone(clone, child_clone)?;
        }
        Ok(clone)
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
