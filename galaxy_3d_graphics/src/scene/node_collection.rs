/// SceneNodeCollection: ordered children of one node.
///
/// The collection is read-only outside the crate. Children are added and
/// removed through `SceneGraph`, which keeps the parent links consistent
/// with the collections and enforces the single-parent rule.

use super::NodeKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneNodeCollection {
    keys: Vec<NodeKey>,
}

impl SceneNodeCollection {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeKey> {
        self.keys.get(index).copied()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn index_of(&self, key: NodeKey) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeKey> + '_ {
        self.keys.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeKey] {
        &self.keys
    }

    pub(crate) fn insert(&mut self, index: usize, key: NodeKey) {
        let index = index.min(self.keys.len());
        self.keys.insert(index, key);
    }

    pub(crate) fn push(&mut self, key: NodeKey) {
        self.keys.push(key);
    }

    pub(crate) fn remove(&mut self, key: NodeKey) -> bool {
        match self.index_of(key) {
            Some(index) => {
                self.keys.remove(index);
                true
            }
            None => false,
        }
    }
}
