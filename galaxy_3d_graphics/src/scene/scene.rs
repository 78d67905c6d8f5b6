/// Scene: a scene graph with a root node, a per-frame query cache and
/// the view-dependent data of its cameras.
///
/// Query results are cached per (query type, reference node). A cached
/// result is reused as long as the frame has not advanced and the graph
/// has not been mutated since it was computed; otherwise its container is
/// reset and evaluated again.

use std::any::{Any, TypeId};
use rustc_hash::FxHashMap;
use crate::camera::ViewDependentCache;
use crate::error::Result;
use crate::render::RenderContext;
use crate::{engine_bail, engine_debug, engine_trace};
use super::query::SceneQuery;
use super::{
    GroupNode, LodGroupNode, NodeData, NodeKey, SceneChangedEvent, SceneGraph,
};

struct CachedQuery {
    frame: u64,
    revision: u64,
    result: Box<dyn Any + Send>,
}

pub struct Scene {
    name: String,
    graph: SceneGraph,
    root: NodeKey,
    view_cache: ViewDependentCache,
    query_cache: FxHashMap<(TypeId, NodeKey), CachedQuery>,
    frame: u64,
    query_evaluations: u64,
}

impl Scene {
    /// Empty scene with a root group node
    pub fn new(name: &str) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", GroupNode);
        Self {
            name: name.to_string(),
            graph,
            root,
            view_cache: ViewDependentCache::new(),
            query_cache: FxHashMap::default(),
            frame: 0,
            query_evaluations: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable graph access; any mutation invalidates cached queries
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn view_cache(&self) -> &ViewDependentCache {
        &self.view_cache
    }

    pub fn view_cache_mut(&mut self) -> &mut ViewDependentCache {
        &mut self.view_cache
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of query evaluations (cache misses) so far
    pub fn query_evaluations(&self) -> u64 {
        self.query_evaluations
    }

    // ===== NODES =====

    /// Create a node under the root
    pub fn add_node<D: NodeData>(&mut self, name: &str, data: D) -> Result<NodeKey> {
        let root = self.root;
        self.add_node_to(root, name, data)
    }

    /// Create a node under `parent`
    pub fn add_node_to<D: NodeData>(&mut self, parent: NodeKey, name: &str, data: D) -> Result<NodeKey> {
        self.graph.node(parent)?;
        let key = self.graph.create_node(name, data);
        self.graph.add_child(parent, key)?;
        Ok(key)
    }

    /// Dispose a node and its subtree, dropping every view-dependent entry
    /// and cached query that references a removed node
    ///
    /// # Errors
    ///
    /// `Error::InvariantViolation` when disposing the root.
    pub fn dispose_node(&mut self, key: NodeKey) -> Result<Vec<NodeKey>> {
        if key == self.root {
            engine_bail!(InvariantViolation, "galaxy3d::Scene",
                "Cannot dispose the root of scene '{}'", self.name);
        }
        let removed = self.graph.dispose(key)?;
        for k in &removed {
            self.view_cache.invalidate_node(*k);
        }
        self.query_cache.retain(|(_, reference), _| !removed.contains(reference));
        Ok(removed)
    }

    // ===== FRAME =====

    /// Advance to `frame`: rebuild stale LOD group bounds, drop view-dependent
    /// data of nodes no longer in the graph and return the scene changes
    /// accumulated since the previous frame
    pub fn begin_frame(&mut self, frame: u64) -> Result<Vec<SceneChangedEvent>> {
        let stale: Vec<NodeKey> = self
            .graph
            .keys()
            .filter(|k| {
                self.graph
                    .node(*k)
                    .ok()
                    .and_then(|n| n.data_as::<LodGroupNode>())
                    .is_some_and(|lod| lod.is_bounds_stale())
            })
            .collect();
        for key in stale {
            self.graph.refresh_lod_bounds(key)?;
        }

        let graph = &self.graph;
        let orphaned = self.view_cache.retain_nodes(|key| graph.contains(key));
        if orphaned > 0 {
            engine_debug!("galaxy3d::Scene", "Dropped {} view-dependent entries of removed nodes", orphaned);
        }

        if frame != self.frame {
            let before = self.query_cache.len();
            self.query_cache.retain(|_, cached| cached.frame + 1 >= frame);
            if before != self.query_cache.len() {
                engine_debug!("galaxy3d::Scene", "Dropped {} stale query results",
                    before - self.query_cache.len());
            }
        }
        self.frame = frame;
        Ok(self.graph.take_scene_changes())
    }

    /// Enabled nodes not represented by a proxy, depth-first from the root
    /// (disabled and proxied subtrees are skipped; `exclude` is left out
    /// but its subtree is kept)
    pub fn candidates(&self, exclude: Option<NodeKey>) -> Result<Vec<NodeKey>> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = self.graph.node(key)?;
            if !node.is_enabled() || node.proxy().is_some() {
                continue;
            }
            if Some(key) != exclude {
                result.push(key);
            }
            stack.extend(node.children().iter().rev());
        }
        Ok(result)
    }

    // ===== QUERIES =====

    /// Evaluate (or reuse) a query for `reference`
    ///
    /// # Errors
    ///
    /// `Error::NodeDisposed` for a stale reference, plus whatever the
    /// query reports.
    pub fn query<Q: SceneQuery + Default>(&mut self, reference: NodeKey, context: &RenderContext) -> Result<&Q> {
        self.graph.node(reference)?;
        let cache_key = (TypeId::of::<Q>(), reference);
        let revision = self.graph.revision();
        let frame = self.frame;

        let fresh = self.query_cache.get(&cache_key).is_some_and(|cached| {
            cached.frame == frame && cached.revision == revision && cached.result.is::<Q>()
        });

        if !fresh {
            let candidates = self.candidates(Some(reference))?;
            let entry = self.query_cache.entry(cache_key).or_insert_with(|| CachedQuery {
                frame,
                revision,
                result: Box::new(Q::default()),
            });
            if !entry.result.is::<Q>() {
                entry.result = Box::new(Q::default());
            }
            let Some(query) = entry.result.downcast_mut::<Q>() else {
                engine_bail!("galaxy3d::Scene", "Query cache holds a foreign type");
            };
            query.reset();
            if let Err(err) = query.set(reference, &candidates, &self.graph, context) {
                self.query_cache.remove(&cache_key);
                return Err(err);
            }
            entry.frame = frame;
            entry.revision = revision;
            self.query_evaluations += 1;
            engine_trace!("galaxy3d::Scene", "Evaluated {} for {:?}", std::any::type_name::<Q>(), reference);
        }

        match self.query_cache.get(&cache_key).and_then(|c| c.result.downcast_ref::<Q>()) {
            Some(query) => Ok(query),
            None => engine_bail!("galaxy3d::Scene", "Query result missing after evaluation"),
        }
    }

    /// Drop every cached query result
    pub fn clear_query_cache(&mut self) {
        self.query_cache.clear();
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
