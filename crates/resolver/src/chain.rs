//! Context chain iteration - ancestor walk over context sources
//!
//! The walk needs nothing framework-specific from the host tree: any node
//! type with a zero-or-one parent accessor works. For one bubbling event the
//! chain yields, per node from the start node to the root, first the node's
//! declared context source (when present), then a synthetic source over the
//! node's attached bindings.

use crate::bindings::{BindingScope, BindingSet};
use crate::source::ContextSource;

/// Parent-capable tree of context sources.
///
/// Implementations must not mutate tree state during lookups; for one
/// bubbling call the chain is deterministic given the tree shape at call
/// time.
pub trait ContextTree<K> {
    /// The parent of `node`, or `None` at the root.
    fn parent_of(&self, node: &K) -> Option<K>;

    /// The context source declared on `node`, if any.
    fn source_of(&self, node: &K) -> Option<&ContextSource<K>>;
}

/// One consultable source in chain order.
#[derive(Debug)]
pub enum ChainSource<'a, K> {
    /// A node's declared context source.
    Declared(&'a ContextSource<K>),
    /// The synthetic source over a node's attached bindings.
    Bindings(BindingScope<'a, K>),
}

/// One chain item: a source plus the node it is bound to.
#[derive(Debug)]
pub struct ChainEntry<'a, K> {
    pub source: ChainSource<'a, K>,
    /// Receiver for dynamic field evaluation; `None` for detached chains
    /// built without a tree.
    pub receiver: Option<K>,
}

impl<'a, K> ChainEntry<'a, K> {
    /// A declared-source entry without a receiver (detached chains).
    pub fn declared(source: &'a ContextSource<K>) -> Self {
        Self {
            source: ChainSource::Declared(source),
            receiver: None,
        }
    }

    /// A declared-source entry bound to its owning node.
    pub fn declared_on(source: &'a ContextSource<K>, receiver: K) -> Self {
        Self {
            source: ChainSource::Declared(source),
            receiver: Some(receiver),
        }
    }
}

/// Lazy, finite, single-pass iterator over the sources to consult for one
/// bubbling event.
pub struct ContextChain<'a, K, T> {
    tree: &'a T,
    bindings: &'a BindingSet<K>,
    cursor: Option<K>,
    declared_done: bool,
}

impl<'a, K, T> ContextChain<'a, K, T>
where
    T: ContextTree<K>,
    K: Clone + PartialEq,
{
    /// Build the chain for an event originating at `start`.
    pub fn new(tree: &'a T, bindings: &'a BindingSet<K>, start: K) -> Self {
        Self {
            tree,
            bindings,
            cursor: Some(start),
            declared_done: false,
        }
    }
}

impl<'a, K, T> Iterator for ContextChain<'a, K, T>
where
    T: ContextTree<K>,
    K: Clone + PartialEq,
{
    type Item = ChainEntry<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor.clone()?;
        if !self.declared_done {
            self.declared_done = true;
            if let Some(source) = self.tree.source_of(&node) {
                return Some(ChainEntry {
                    source: ChainSource::Declared(source),
                    receiver: Some(node),
                });
            }
        }
        // Bindings close out the node, then the walk moves to the parent
        self.declared_done = false;
        self.cursor = self.tree.parent_of(&node);
        Some(ChainEntry {
            source: ChainSource::Bindings(self.bindings.scope(node.clone())),
            receiver: Some(node),
        })
    }
}
