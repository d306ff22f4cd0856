// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat lookup structures derived from a [`Forest`].

use alloc::vec::Vec;
use core::hash::Hash;
use core::ops::Range;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::types::{Forest, TreeNode};

/// Errors raised while indexing a forest.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError<K> {
    /// The same key appears on more than one node.
    #[error("duplicate key {0:?} in forest")]
    DuplicateKey(K),
}

/// Child positions from a root down to a node.
type NodePath = SmallVec<[u32; 8]>;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K> {
    pub(crate) key: K,
    pub(crate) parent: Option<usize>,
    pub(crate) depth: usize,
    /// One past the last descendant slot.
    pub(crate) end: usize,
    pub(crate) leaf: bool,
    path: NodePath,
}

impl<K> Entry<K> {
    pub(crate) fn has_children(&self, slot: usize) -> bool {
        self.end > slot + 1
    }
}

/// Lookup structures for one version of a forest.
///
/// Nodes are numbered in pre-order, so the descendants of a node occupy the
/// contiguous slots directly after it. This makes `descendants_of` a slice walk
/// and `parent_of` a single lookup, instead of a search of the whole forest.
///
/// The index holds a handle to the forest it was built from; use
/// [`TreeIndex::is_current`] to decide whether it needs rebuilding after the
/// host supplies a forest.
///
/// ## Example
///
/// ```rust
/// use understory_tree_state::{Forest, TreeIndex, TreeNode};
///
/// let forest = Forest::new(vec![
///     TreeNode::new("fruits", "Fruits").with_children([
///         TreeNode::new("apple", "Apple"),
///         TreeNode::new("banana", "Banana"),
///     ]),
/// ]);
/// let index = TreeIndex::build(forest).unwrap();
///
/// assert_eq!(index.parent_of(&"apple"), Some(&"fruits"));
/// assert_eq!(index.descendants_of(&"fruits").count(), 2);
/// assert!(index.find(&"cherry").is_none());
/// ```
#[derive(Debug)]
pub struct TreeIndex<K, T> {
    forest: Forest<K, T>,
    entries: Vec<Entry<K>>,
    slots: HashMap<K, usize>,
}

impl<K, T> TreeIndex<K, T>
where
    K: Clone + Eq + Hash,
{
    /// Index `forest`, failing if a key occurs twice.
    pub fn build(forest: Forest<K, T>) -> Result<Self, IndexError<K>> {
        let mut entries = Vec::new();
        let mut slots = HashMap::new();
        let mut path = NodePath::new();
        index_level(
            forest.roots(),
            None,
            0,
            &mut path,
            &mut entries,
            &mut slots,
        )?;
        log::trace!("indexed forest with {} nodes", entries.len());
        Ok(Self {
            forest,
            entries,
            slots,
        })
    }

    /// The forest this index describes.
    pub fn forest(&self) -> &Forest<K, T> {
        &self.forest
    }

    /// Whether this index was built from `forest` (by identity).
    pub fn is_current(&self, forest: &Forest<K, T>) -> bool {
        Forest::ptr_eq(&self.forest, forest)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` names a node of this forest.
    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Every key, in pre-order.
    pub fn all_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    /// The node with `key`, or `None` if it is not (or no longer) in the forest.
    pub fn find(&self, key: &K) -> Option<&TreeNode<K, T>> {
        self.slot_of(key).map(|slot| self.node_at(slot))
    }

    /// The parent key of `key`; `None` for roots and unknown keys.
    pub fn parent_of(&self, key: &K) -> Option<&K> {
        let slot = self.slot_of(key)?;
        self.entries[slot].parent.map(|p| &self.entries[p].key)
    }

    /// Ancestors of `key`, nearest first. Empty for roots and unknown keys.
    pub fn ancestors_of(&self, key: &K) -> impl Iterator<Item = &K> + '_ {
        let start = self.slot_of(key).and_then(|slot| self.entries[slot].parent);
        self.ancestor_slots_from(start)
            .map(|slot| &self.entries[slot].key)
    }

    /// Direct children of `key`, in order. Empty for leaves and unknown keys.
    pub fn children_of(&self, key: &K) -> impl Iterator<Item = &K> + '_ {
        let slots = match self.slot_of(key) {
            Some(slot) => self.child_slots(slot),
            None => self.child_slots_empty(),
        };
        slots.map(|slot| &self.entries[slot].key)
    }

    /// All keys below `key`, excluding `key` itself, in pre-order.
    pub fn descendants_of(&self, key: &K) -> impl Iterator<Item = &K> + '_ {
        let range = self
            .slot_of(key)
            .map(|slot| self.descendant_slots(slot))
            .unwrap_or(0..0);
        self.entries[range].iter().map(|e| &e.key)
    }

    /// Depth of `key` (roots are at depth 0).
    pub fn depth_of(&self, key: &K) -> Option<usize> {
        self.slot_of(key).map(|slot| self.entries[slot].depth)
    }

    /// Whether `key` is a leaf, honoring the node's explicit override.
    pub fn is_leaf(&self, key: &K) -> Option<bool> {
        self.slot_of(key).map(|slot| self.entries[slot].leaf)
    }

    // --- crate internals, addressed by pre-order slot ---

    pub(crate) fn slot_of(&self, key: &K) -> Option<usize> {
        self.slots.get(key).copied()
    }

    pub(crate) fn entry(&self, slot: usize) -> &Entry<K> {
        &self.entries[slot]
    }

    pub(crate) fn descendant_slots(&self, slot: usize) -> Range<usize> {
        slot + 1..self.entries[slot].end
    }

    pub(crate) fn child_slots(&self, slot: usize) -> ChildSlots<'_, K> {
        ChildSlots {
            entries: &self.entries,
            next: slot + 1,
            end: self.entries[slot].end,
        }
    }

    fn child_slots_empty(&self) -> ChildSlots<'_, K> {
        ChildSlots {
            entries: &self.entries,
            next: 0,
            end: 0,
        }
    }

    /// Slots of the roots, in order.
    pub(crate) fn root_slots(&self) -> ChildSlots<'_, K> {
        ChildSlots {
            entries: &self.entries,
            next: 0,
            end: self.entries.len(),
        }
    }

    pub(crate) fn ancestor_slots_from(
        &self,
        start: Option<usize>,
    ) -> impl Iterator<Item = usize> + '_ {
        core::iter::successors(start, |&slot| self.entries[slot].parent)
    }

    /// Resolve a slot back to its node by following the stored child path.
    pub(crate) fn node_at(&self, slot: usize) -> &TreeNode<K, T> {
        let path = &self.entries[slot].path;
        let mut node = &self.forest.roots()[path[0] as usize];
        for &pos in &path[1..] {
            node = &node.children[pos as usize];
        }
        node
    }
}

/// Iterator over sibling slots, skipping each sibling's subtree.
#[derive(Clone, Debug)]
pub(crate) struct ChildSlots<'a, K> {
    entries: &'a [Entry<K>],
    next: usize,
    end: usize,
}

impl<K> Iterator for ChildSlots<'_, K> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.end {
            return None;
        }
        let slot = self.next;
        self.next = self.entries[slot].end;
        Some(slot)
    }
}

fn index_level<K, T>(
    nodes: &[TreeNode<K, T>],
    parent: Option<usize>,
    depth: usize,
    path: &mut NodePath,
    entries: &mut Vec<Entry<K>>,
    slots: &mut HashMap<K, usize>,
) -> Result<(), IndexError<K>>
where
    K: Clone + Eq + Hash,
{
    for (pos, node) in nodes.iter().enumerate() {
        let slot = entries.len();
        if slots.insert(node.key.clone(), slot).is_some() {
            return Err(IndexError::DuplicateKey(node.key.clone()));
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Sibling counts beyond u32::MAX are not supported."
        )]
        path.push(pos as u32);
        entries.push(Entry {
            key: node.key.clone(),
            parent,
            depth,
            end: slot + 1,
            leaf: node.is_leaf(),
            path: path.clone(),
        });
        index_level(&node.children, Some(slot), depth + 1, path, entries, slots)?;
        entries[slot].end = entries.len();
        path.pop();
    }
    Ok(())
}
