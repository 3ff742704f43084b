//! Ready-made tree adapters
//!
//! Hosts with their own component tree implement [`ContextTree`] directly;
//! [`MapTree`] covers hosts that just need somewhere to hang parent links
//! and declarations (tests, detached widget hierarchies).

use std::collections::HashMap;
use std::hash::Hash;

use crate::chain::ContextTree;
use crate::source::ContextSource;

struct NodeSlot<K> {
    parent: Option<K>,
    source: Option<ContextSource<K>>,
}

/// Map-backed context tree keyed by opaque node ids.
pub struct MapTree<K> {
    nodes: HashMap<K, NodeSlot<K>>,
}

impl<K: Eq + Hash + Clone> MapTree<K> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Insert a node with an optional parent link. Re-inserting a node
    /// replaces its parent link and drops its declaration.
    pub fn insert(&mut self, node: K, parent: Option<K>) {
        self.nodes.insert(
            node,
            NodeSlot {
                parent,
                source: None,
            },
        );
    }

    /// Declare a context source on an existing node; inserts the node as a
    /// root when it is unknown.
    pub fn declare(&mut self, node: K, source: ContextSource<K>) {
        self.nodes
            .entry(node)
            .or_insert(NodeSlot {
                parent: None,
                source: None,
            })
            .source = Some(source);
    }

    /// Remove a node and its declaration. Children keep their (now dangling)
    /// parent link and become chain roots.
    pub fn remove(&mut self, node: &K) {
        self.nodes.remove(node);
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for MapTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> ContextTree<K> for MapTree<K> {
    fn parent_of(&self, node: &K) -> Option<K> {
        self.nodes.get(node).and_then(|slot| slot.parent.clone())
    }

    fn source_of(&self, node: &K) -> Option<&ContextSource<K>> {
        self.nodes.get(node).and_then(|slot| slot.source.as_ref())
    }
}

impl<K> std::fmt::Debug for MapTree<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
