// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Copy-on-write key sets used for expanded, selected, and checked state.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashSet;

/// An immutable, insertion-ordered set of node keys.
///
/// Every committed state transition produces a fresh `KeySet`; an unchanged
/// state keeps the same allocation. Hosts can therefore detect changes with
/// [`KeySet::ptr_eq`] instead of comparing contents.
///
/// Equality (`==`) compares membership only and ignores order.
pub struct KeySet<K> {
    inner: Arc<Inner<K>>,
}

struct Inner<K> {
    order: Vec<K>,
    members: HashSet<K>,
}

impl<K> Clone for KeySet<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for KeySet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.order.iter()).finish()
    }
}

impl<K: Clone + Eq + Hash> Default for KeySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> PartialEq for KeySet<K> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.inner.members == other.inner.members
    }
}

impl<K: Clone + Eq + Hash> Eq for KeySet<K> {}

impl<K: Clone + Eq + Hash> FromIterator<K> for KeySet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut edit = KeySetEdit::empty();
        for key in iter {
            edit.insert(key);
        }
        edit.finish()
    }
}

impl<K: Clone + Eq + Hash> KeySet<K> {
    /// An empty set.
    pub fn new() -> Self {
        KeySetEdit::empty().finish()
    }

    /// Whether `key` is a member.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.members.contains(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }

    /// Keys in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, K> {
        self.inner.order.iter()
    }

    /// Keys in insertion order, as a slice.
    pub fn as_slice(&self) -> &[K] {
        &self.inner.order
    }

    /// Whether two handles share one allocation (no transition happened between them).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Start a working copy of this set.
    pub fn edit(&self) -> KeySetEdit<K> {
        KeySetEdit {
            order: self.inner.order.clone(),
            members: self.inner.members.clone(),
            stale: false,
        }
    }

    /// A new set with `key` added (or `self` unchanged if already present).
    pub fn with(&self, key: K) -> Self {
        if self.contains(&key) {
            return self.clone();
        }
        let mut edit = self.edit();
        edit.insert(key);
        edit.finish()
    }

    /// A new set with `key` removed (or `self` unchanged if absent).
    pub fn without(&self, key: &K) -> Self {
        if !self.contains(key) {
            return self.clone();
        }
        let mut edit = self.edit();
        edit.remove(key);
        edit.finish()
    }

    /// A new set with `key` flipped.
    pub fn toggled(&self, key: &K) -> Self {
        if self.contains(key) {
            self.without(key)
        } else {
            self.with(key.clone())
        }
    }
}

impl<'a, K: Clone + Eq + Hash> IntoIterator for &'a KeySet<K> {
    type Item = &'a K;
    type IntoIter = core::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A mutable working copy of a [`KeySet`].
///
/// Propagation accumulates many insertions and removals before committing a
/// single new snapshot with [`KeySetEdit::finish`].
pub struct KeySetEdit<K> {
    /// May hold removed or repeated keys until `finish` compacts it.
    order: Vec<K>,
    members: HashSet<K>,
    stale: bool,
}

impl<K: fmt::Debug> fmt::Debug for KeySetEdit<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

impl<K: Clone + Eq + Hash> KeySetEdit<K> {
    fn empty() -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
            stale: false,
        }
    }

    /// Whether `key` is currently a member.
    pub fn contains(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    /// Add `key`; returns `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.members.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push(key);
        true
    }

    /// Remove `key`; returns `false` if it was absent.
    pub fn remove(&mut self, key: &K) -> bool {
        if !self.members.remove(key) {
            return false;
        }
        self.stale = true;
        true
    }

    /// Number of keys in the working copy.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the working copy is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Commit the working copy into a new snapshot.
    pub fn finish(mut self) -> KeySet<K> {
        if self.stale {
            // A key removed and inserted again sits at its latest position.
            let mut seen = HashSet::with_capacity(self.members.len());
            let mut kept = Vec::with_capacity(self.members.len());
            for key in core::mem::take(&mut self.order).into_iter().rev() {
                if self.members.contains(&key) && seen.insert(key.clone()) {
                    kept.push(key);
                }
            }
            kept.reverse();
            self.order = kept;
        }
        KeySet {
            inner: Arc::new(Inner {
                order: self.order,
                members: self.members,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn iteration_follows_insertion_order() {
        let set: KeySet<&str> = ["c", "a", "b", "a"].into_iter().collect();
        assert_eq!(set.as_slice(), &["c", "a", "b"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn unchanged_updates_keep_identity() {
        let set: KeySet<u32> = [1, 2].into_iter().collect();
        assert!(KeySet::ptr_eq(&set, &set.with(1)));
        assert!(KeySet::ptr_eq(&set, &set.without(&9)));

        let grown = set.with(3);
        assert!(!KeySet::ptr_eq(&set, &grown));
        assert!(!set.contains(&3), "snapshots are never mutated in place");
    }

    #[test]
    fn equality_ignores_order() {
        let a: KeySet<u32> = vec![1, 2, 3].into_iter().collect();
        let b: KeySet<u32> = vec![3, 1, 2].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, b.without(&2));
    }

    #[test]
    fn toggled_flips_membership() {
        let set: KeySet<u32> = KeySet::new();
        let on = set.toggled(&7);
        assert!(on.contains(&7));
        assert!(!on.toggled(&7).contains(&7));
    }

    #[test]
    fn edit_removal_preserves_remaining_order() {
        let set: KeySet<u32> = [4, 5, 6].into_iter().collect();
        let mut edit = set.edit();
        assert!(edit.remove(&5));
        assert!(!edit.remove(&5));
        assert!(edit.insert(1));
        assert!(!edit.insert(4));
        assert!(edit.remove(&4));
        assert!(edit.insert(4));
        assert_eq!(edit.finish().as_slice(), &[6, 1, 4]);
    }
}
