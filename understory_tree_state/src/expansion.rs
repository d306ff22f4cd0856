// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expansion controller: which branches are open.

use core::hash::Hash;

use crate::authority::{Authority, Controlled};
use crate::index::TreeIndex;
use crate::keys::KeySet;
use crate::types::TreeNode;

/// Reported when a node's expansion changes.
#[derive(Clone, Debug)]
pub struct ExpandEvent<'a, K, T> {
    /// The proposed expanded set after the transition.
    pub keys: KeySet<K>,
    /// The node that was toggled.
    pub node: &'a TreeNode<K, T>,
    /// Whether the node is expanded after the transition.
    pub expanded: bool,
}

/// How the expanded set is populated at construction.
#[derive(Copy, Clone, Debug)]
pub struct ExpansionSeed<'s, K> {
    /// Keys expanded initially.
    pub keys: &'s [K],
    /// Expand every node, ignoring `keys`.
    pub expand_all: bool,
    /// Also expand the ancestors of each seeded key so it is reachable.
    pub auto_expand_parent: bool,
}

impl<K> ExpansionSeed<'_, K>
where
    K: Clone + Eq + Hash,
{
    /// Resolve the seed against `index`.
    ///
    /// Seeded keys unknown to the index are kept as-is; they take effect if
    /// the host later supplies a forest containing them.
    pub fn resolve<T>(&self, index: &TreeIndex<K, T>) -> KeySet<K> {
        if self.expand_all {
            return index.all_keys().cloned().collect();
        }
        let mut edit = KeySet::new().edit();
        for key in self.keys {
            edit.insert(key.clone());
            if self.auto_expand_parent {
                for ancestor in index.ancestors_of(key) {
                    edit.insert(ancestor.clone());
                }
            }
        }
        edit.finish()
    }
}

/// Compute the expanded set after setting `key` to `expanded`.
///
/// Returns `None` (and emits nothing) when `key` is stale, names a leaf or a
/// disabled node, or already has the requested state.
pub fn propose_expanded<'a, K, T>(
    index: &'a TreeIndex<K, T>,
    keys: &KeySet<K>,
    key: &K,
    expanded: bool,
) -> Option<ExpandEvent<'a, K, T>>
where
    K: Clone + Eq + Hash,
{
    let Some(node) = index.find(key) else {
        log::debug!("expand intent ignored: key is not in the forest");
        return None;
    };
    if node.is_leaf() || node.is_disabled() {
        log::debug!("expand intent ignored: node is a leaf or disabled");
        return None;
    }
    if keys.contains(key) == expanded {
        return None;
    }
    let next = if expanded {
        keys.with(key.clone())
    } else {
        keys.without(key)
    };
    Some(ExpandEvent {
        keys: next,
        node,
        expanded,
    })
}

/// Owns the expanded-key set of one tree view.
#[derive(Clone, Debug)]
pub struct Expansion<K> {
    keys: Controlled<KeySet<K>>,
}

impl<K> Default for Expansion<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new(KeySet::new())
    }
}

impl<K> Expansion<K>
where
    K: Clone + Eq + Hash,
{
    /// Engine-owned expansion starting from `initial`.
    pub fn new(initial: KeySet<K>) -> Self {
        Self {
            keys: Controlled::internal(initial),
        }
    }

    /// Host-owned expansion; transitions are proposed, never committed.
    pub fn controlled(keys: KeySet<K>) -> Self {
        Self {
            keys: Controlled::external(keys),
        }
    }

    /// Engine-owned unless `external` is supplied.
    pub fn resolve(external: Option<KeySet<K>>, initial: impl FnOnce() -> KeySet<K>) -> Self {
        Self {
            keys: Controlled::resolve(external, initial),
        }
    }

    /// Who owns the expanded set.
    pub fn authority(&self) -> Authority {
        self.keys.authority()
    }

    /// The current expanded set.
    pub fn keys(&self) -> &KeySet<K> {
        self.keys.get()
    }

    /// Whether `key` is expanded.
    pub fn is_expanded(&self, key: &K) -> bool {
        self.keys.get().contains(key)
    }

    /// Feed back a host-owned value (or reset an engine-owned one).
    pub fn sync(&mut self, keys: KeySet<K>) {
        self.keys.sync(keys);
    }

    /// Flip the expansion of `key`.
    pub fn toggle<'a, T>(
        &mut self,
        index: &'a TreeIndex<K, T>,
        key: &K,
    ) -> Option<ExpandEvent<'a, K, T>> {
        let expanded = !self.is_expanded(key);
        self.set_expanded(index, key, expanded)
    }

    /// Expand or collapse `key`; no-op if it already has that state.
    pub fn set_expanded<'a, T>(
        &mut self,
        index: &'a TreeIndex<K, T>,
        key: &K,
        expanded: bool,
    ) -> Option<ExpandEvent<'a, K, T>> {
        let event = propose_expanded(index, self.keys.get(), key, expanded)?;
        if self.keys.propose(event.keys.clone()) {
            log::trace!("expansion committed ({} expanded)", event.keys.len());
        }
        Some(event)
    }

    /// Propose expanding every branch; returns the proposed set.
    pub fn expand_all<T>(&mut self, index: &TreeIndex<K, T>) -> KeySet<K> {
        let next: KeySet<K> = index
            .all_keys()
            .filter(|key| index.is_leaf(key) == Some(false))
            .cloned()
            .collect();
        self.keys.propose(next.clone());
        next
    }

    /// Propose collapsing everything; returns the proposed set.
    pub fn collapse_all(&mut self) -> KeySet<K> {
        let next = KeySet::new();
        self.keys.propose(next.clone());
        next
    }
}
