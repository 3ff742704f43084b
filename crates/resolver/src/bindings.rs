//! Bindings - context sources attached directly to leaf nodes
//!
//! Bindings live in one flat list, independent of the context chain, and are
//! matched by pattern. Lifecycle is attach/detach on node mount/unmount;
//! detach is idempotent and safe while an iteration triggered by the same
//! binding is still running (matching works on snapshots, never indexes).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use contracts::Payload;

/// Handle to one attached binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// What an attached binding does to matching events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingRole {
    /// Merge the binding's payload into every matching event.
    MergeAlways,
    /// Veto every matching event.
    Veto,
}

/// A context source attached to a leaf node.
#[derive(Debug, Clone)]
pub struct Binding<K> {
    /// Node the binding is attached to.
    pub node: K,
    /// Only events with this sub-key match; `None` matches every key.
    pub key: Option<String>,
    /// Owning component node, for component-scoped matching by adapters.
    pub owner: Option<K>,
    /// Merge-always or veto.
    pub role: BindingRole,
    /// Fields contributed by a merge binding.
    pub value: Payload,
}

impl<K> Binding<K> {
    /// A merge-always binding on `node`.
    pub fn merge(node: K, key: Option<String>, value: Payload) -> Self {
        Self {
            node,
            key,
            owner: None,
            role: BindingRole::MergeAlways,
            value,
        }
    }

    /// A veto binding on `node`.
    pub fn veto(node: K, key: Option<String>) -> Self {
        Self {
            node,
            key,
            owner: None,
            role: BindingRole::Veto,
            value: Payload::new(),
        }
    }

    /// Scope the binding to an owning component node.
    pub fn owned_by(mut self, owner: K) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Match pattern over the binding list. Unset fields match everything;
/// a binding without a key matches every pattern key.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingPattern<'a, K> {
    pub node: Option<&'a K>,
    pub key: Option<&'a str>,
    pub owner: Option<&'a K>,
}

fn is_matched<K: PartialEq>(binding: &Binding<K>, pattern: &BindingPattern<'_, K>) -> bool {
    let key_matches = match (&binding.key, pattern.key) {
        (None, _) => true,
        (Some(bound), Some(wanted)) => bound == wanted,
        (Some(_), None) => false,
    };
    key_matches
        && pattern.node.is_none_or(|node| binding.node == *node)
        && pattern
            .owner
            .is_none_or(|owner| binding.owner.as_ref() == Some(owner))
}

/// Flat list of attached bindings.
#[derive(Debug, Default)]
pub struct BindingSet<K> {
    entries: RwLock<Vec<(BindingId, Binding<K>)>>,
    next_id: AtomicU64,
}

impl<K: Clone + PartialEq> BindingSet<K> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Attach a binding, returning its detach handle.
    pub fn attach(&self, binding: Binding<K>) -> BindingId {
        let id = BindingId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, binding));
        observability::record_binding_attached();
        id
    }

    /// Detach a binding. Detaching an already-detached binding is a no-op.
    pub fn detach(&self, id: BindingId) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;
        if removed {
            observability::record_binding_detached();
        }
        removed
    }

    /// Replace an attached binding's payload in place (re-rendered values).
    pub fn update(&self, id: BindingId, value: Payload) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            Some((_, binding)) => {
                binding.value = value;
                true
            }
            None => false,
        }
    }

    /// Number of attached bindings.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of matching bindings with `role`, in attach order.
    fn matching(&self, pattern: &BindingPattern<'_, K>, role: BindingRole) -> Vec<Binding<K>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(_, binding)| binding.role == role && is_matched(binding, pattern))
            .map(|(_, binding)| binding.clone())
            .collect()
    }

    /// Whether any veto binding matches the pattern.
    pub fn is_prevented(&self, pattern: &BindingPattern<'_, K>) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|(_, binding)| binding.role == BindingRole::Veto && is_matched(binding, pattern))
    }

    /// Merge every matching merge-always binding under `data`.
    ///
    /// Bindings are folded in reverse registration order, so among bindings
    /// the earliest-attached one wins a contested field; incoming `data`
    /// fields win over all bindings.
    pub fn merge_always(&self, pattern: &BindingPattern<'_, K>, data: Payload) -> Payload {
        let matching = self.matching(pattern, BindingRole::MergeAlways);
        let mut merged = Payload::new();
        for binding in matching.iter().rev() {
            for (field, value) in &binding.value {
                merged.insert(field.clone(), value.clone());
            }
        }
        for (field, value) in data {
            merged.insert(field, value);
        }
        merged
    }

    /// The synthetic per-node context source used by the chain iterator.
    pub fn scope(&self, node: K) -> BindingScope<'_, K> {
        BindingScope { set: self, node }
    }
}

/// View of one node's attached bindings, yielded by the chain iterator as a
/// synthetic context source.
#[derive(Debug)]
pub struct BindingScope<'a, K> {
    set: &'a BindingSet<K>,
    node: K,
}

impl<K: Clone + PartialEq> BindingScope<'_, K> {
    /// Whether a veto binding matches (node, key).
    pub fn prevented(&self, key: &str) -> bool {
        self.set.is_prevented(&BindingPattern {
            node: Some(&self.node),
            key: Some(key),
            owner: None,
        })
    }

    /// Merge matching merge-always bindings under `data`.
    pub fn merge_defaults(&self, key: &str, data: Payload) -> Payload {
        self.set.merge_always(
            &BindingPattern {
                node: Some(&self.node),
                key: Some(key),
                owner: None,
            },
            data,
        )
    }

    /// The node this scope covers.
    pub fn node(&self) -> &K {
        &self.node
    }
}
