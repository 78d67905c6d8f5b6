/// Scene-changed notifications.
///
/// Every mutation of the graph produces a `SceneChangedEvent`. The event
/// is delivered to the node that changed and then to each of its
/// ancestors (`NodeData::on_scene_changed`), and queued on the graph
/// until drained with `SceneGraph::take_scene_changes`.

use bitflags::bitflags;
use super::NodeKey;

bitflags! {
    /// Kind of change carried by a `SceneChangedEvent`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SceneChanges: u8 {
        /// Local or world pose changed
        const POSE_CHANGED = 1 << 0;
        /// Shape or world scale changed (bounds must be recomputed)
        const SHAPE_CHANGED = 1 << 1;
        /// Node was attached to a parent
        const NODE_ADDED = 1 << 2;
        /// Node was detached from its parent or disposed
        const NODE_REMOVED = 1 << 3;
    }
}

/// A change in the scene, with the node it originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChangedEvent {
    pub source: NodeKey,
    pub changes: SceneChanges,
}
