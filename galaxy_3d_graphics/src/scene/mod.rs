//! Scene module - node hierarchy, transform propagation and scene queries.
//!
//! - `SceneGraph`: arena of `SceneNode`s addressed by `NodeKey`, lazy world
//!   transforms, subtree cloning and scene-changed events
//! - `nodes`: concrete node kinds (`MeshNode`, `CameraNode`, `LightNode`, ...)
//! - `Scene`: a graph with a root node, per-frame query cache and
//!   view-dependent data
//! - `SceneManager`: named scenes
//! - `query`: shadow-caster and camera-frustum queries with LOD resolution

mod node;
mod node_collection;
mod node_data;
mod events;
mod scene_graph;
mod scene;
mod scene_manager;
pub mod nodes;
pub mod query;

pub use node::{SceneNode, NodeKey, NodeFlags};
pub use node_collection::SceneNodeCollection;
pub use node_data::{NodeData, CloneContext, downcast_source};
pub use events::{SceneChanges, SceneChangedEvent};
pub use scene_graph::{SceneGraph, TransformStats};
pub use scene::Scene;
pub use scene_manager::SceneManager;
pub use nodes::*;
pub use query::{SceneQuery, ShadowCasterQuery, CameraFrustumQuery};
