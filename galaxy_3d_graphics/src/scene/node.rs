/// SceneNode: a node of the scene graph.
///
/// Local pose and scale are authoritative. World pose, world scale and
/// the world AABB are derived lazily by `SceneGraph` and cached in the
/// node until a mutation marks them stale.

use std::cell::Cell;
use bitflags::bitflags;
use glam::Vec3;
use slotmap::new_key_type;
use crate::math::{Pose, Shape, AABB};
use super::{NodeData, SceneNodeCollection};

new_key_type! {
    /// Stable key of a node in a `SceneGraph`
    pub struct NodeKey;
}

bitflags! {
    /// Boolean node state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        /// Node (and its subtree) takes part in rendering and queries
        const ENABLED = 1 << 0;
        /// Node is not expected to move
        const STATIC = 1 << 1;
        /// Node produces draw calls
        const RENDERABLE = 1 << 2;
        /// Node is drawn into shadow maps
        const CASTS_SHADOWS = 1 << 3;
        /// An occlusion pass proved the node casts no visible shadow
        const SHADOW_CASTER_CULLED = 1 << 4;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        NodeFlags::ENABLED
    }
}

/// Lazily derived value
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cached<T: Copy> {
    Valid(T),
    Stale,
}

impl<T: Copy> Cached<T> {
    pub(crate) fn get(&self) -> Option<T> {
        match *self {
            Cached::Valid(value) => Some(value),
            Cached::Stale => None,
        }
    }
}

pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: SceneNodeCollection,
    pub(crate) pose_local: Pose,
    pub(crate) scale_local: Vec3,
    pub(crate) pose_world: Cell<Cached<Pose>>,
    pub(crate) scale_world: Cell<Cached<Vec3>>,
    pub(crate) aabb: Cell<Cached<AABB>>,
    pub(crate) shape: Shape,
    pub(crate) flags: NodeFlags,
    pub(crate) user_flags: u16,
    pub(crate) max_distance: f32,
    pub(crate) proxy: Option<NodeKey>,
    pub(crate) last_pose_world: Option<Pose>,
    pub(crate) last_scale_world: Option<Vec3>,
    pub(crate) data: Box<dyn NodeData>,
}

impl SceneNode {
    /// Detached node with identity transforms, `Empty` shape (unless the
    /// data implies one), enabled, caches stale
    pub(crate) fn new(name: String, data: Box<dyn NodeData>) -> Self {
        let shape = data.bounding_shape().unwrap_or_default();
        Self {
            name,
            parent: None,
            children: SceneNodeCollection::default(),
            pose_local: Pose::IDENTITY,
            scale_local: Vec3::ONE,
            pose_world: Cell::new(Cached::Stale),
            scale_world: Cell::new(Cached::Stale),
            aabb: Cell::new(Cached::Stale),
            shape,
            flags: NodeFlags::default(),
            user_flags: 0,
            max_distance: 0.0,
            proxy: None,
            last_pose_world: None,
            last_scale_world: None,
            data,
        }
    }

    /// Copy of the base state with other data: detached, no children,
    /// caches stale
    pub(crate) fn clone_base(&self, data: Box<dyn NodeData>) -> Self {
        Self {
            name: self.name.clone(),
            parent: None,
            children: SceneNodeCollection::default(),
            pose_local: self.pose_local,
            scale_local: self.scale_local,
            pose_world: Cell::new(Cached::Stale),
            scale_world: Cell::new(Cached::Stale),
            aabb: Cell::new(Cached::Stale),
            shape: self.shape,
            flags: self.flags,
            user_flags: self.user_flags,
            max_distance: self.max_distance,
            proxy: self.proxy,
            last_pose_world: self.last_pose_world,
            last_scale_world: self.last_scale_world,
            data,
        }
    }

    /// Mark world pose, world scale and AABB stale.
    /// Returns false if they already were.
    pub(crate) fn invalidate_world(&self) -> bool {
        let was_valid = self.pose_world.get() != Cached::Stale
            || self.scale_world.get() != Cached::Stale
            || self.aabb.get() != Cached::Stale;
        self.pose_world.set(Cached::Stale);
        self.scale_world.set(Cached::Stale);
        self.aabb.set(Cached::Stale);
        was_valid
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &SceneNodeCollection {
        &self.children
    }

    pub fn pose_local(&self) -> Pose {
        self.pose_local
    }

    pub fn scale_local(&self) -> Vec3 {
        self.scale_local
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Own enabled flag (see `SceneGraph::actual_is_enabled`)
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::ENABLED)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(NodeFlags::STATIC)
    }

    pub fn is_renderable(&self) -> bool {
        self.flags.contains(NodeFlags::RENDERABLE)
    }

    pub fn casts_shadows(&self) -> bool {
        self.flags.contains(NodeFlags::CASTS_SHADOWS)
    }

    pub fn is_shadow_caster_culled(&self) -> bool {
        self.flags.contains(NodeFlags::SHADOW_CASTER_CULLED)
    }

    pub fn user_flags(&self) -> u16 {
        self.user_flags
    }

    /// View-normalized culling distance, 0 = disabled
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Node representing this one in scene queries
    pub fn proxy(&self) -> Option<NodeKey> {
        self.proxy
    }

    pub fn last_pose_world(&self) -> Option<Pose> {
        self.last_pose_world
    }

    pub fn last_scale_world(&self) -> Option<Vec3> {
        self.last_scale_world
    }

    pub fn data(&self) -> &dyn NodeData {
        self.data.as_ref()
    }

    /// Data of the given kind, if the node is of that kind
    pub fn data_as<T: NodeData>(&self) -> Option<&T> {
        self.data.as_any().downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.data.type_name()
    }
}
