// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for tree data: nodes, flags, forests, and tri-state values.

use alloc::sync::Arc;
use alloc::vec::Vec;

bitflags::bitflags! {
    /// Per-node policy flags layered over the global tree configuration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node accepts select intents.
        const SELECTABLE        = 0b0000_0001;
        /// Node shows a checkbox and accepts check intents.
        const CHECKABLE         = 0b0000_0010;
        /// Node is disabled: no expand, select, or check intents apply to it.
        const DISABLED          = 0b0000_0100;
        /// Only the checkbox is disabled; the node can still be expanded and selected.
        const CHECKBOX_DISABLED = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::SELECTABLE | Self::CHECKABLE
    }
}

/// A node of a [`Forest`].
///
/// Keys must be unique across the whole forest; [`TreeIndex::build`] rejects
/// duplicates. Titles are opaque to the engine.
///
/// [`TreeIndex::build`]: crate::TreeIndex::build
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode<K, T> {
    /// Unique, render-stable identifier.
    pub key: K,
    /// Display payload.
    pub title: T,
    /// Ordered children, owned by this node.
    pub children: Vec<Self>,
    /// Policy overrides for this node.
    pub flags: NodeFlags,
    /// Explicit leaf override. When `None`, a node is a leaf iff it has no children.
    pub is_leaf: Option<bool>,
}

impl<K, T> TreeNode<K, T> {
    /// Create a childless node with default flags.
    pub fn new(key: K, title: T) -> Self {
        Self {
            key,
            title,
            children: Vec::new(),
            flags: NodeFlags::default(),
            is_leaf: None,
        }
    }

    /// Replace the children of this node.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Replace the flags of this node.
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark this node disabled.
    pub fn disabled(mut self) -> Self {
        self.flags |= NodeFlags::DISABLED;
        self
    }

    /// Override leaf inference.
    pub fn with_leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the node is a leaf, honoring the explicit override.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf.unwrap_or(self.children.is_empty())
    }

    /// Whether the node is disabled.
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(NodeFlags::DISABLED)
    }

    /// Whether a select intent may target this node.
    pub fn can_select(&self) -> bool {
        self.flags.contains(NodeFlags::SELECTABLE) && !self.is_disabled()
    }

    /// Whether a check intent may change this node's membership.
    pub fn can_check(&self) -> bool {
        self.flags.contains(NodeFlags::CHECKABLE) && !self.checkbox_locked()
    }

    /// Whether the checkbox is locked, either by `DISABLED` or `CHECKBOX_DISABLED`.
    ///
    /// Locked nodes keep their membership through propagation.
    pub fn checkbox_locked(&self) -> bool {
        self.flags
            .intersects(NodeFlags::DISABLED | NodeFlags::CHECKBOX_DISABLED)
    }
}

/// An ordered collection of root nodes.
///
/// Cloning a forest is cheap and preserves identity; [`Forest::ptr_eq`] is how
/// indices and caches decide whether they still describe the same data.
#[derive(Debug)]
pub struct Forest<K, T> {
    roots: Arc<[TreeNode<K, T>]>,
}

impl<K, T> Clone for Forest<K, T> {
    fn clone(&self) -> Self {
        Self {
            roots: Arc::clone(&self.roots),
        }
    }
}

impl<K, T> Default for Forest<K, T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<K, T> From<Vec<TreeNode<K, T>>> for Forest<K, T> {
    fn from(roots: Vec<TreeNode<K, T>>) -> Self {
        Self::new(roots)
    }
}

impl<K, T> FromIterator<TreeNode<K, T>> for Forest<K, T> {
    fn from_iter<I: IntoIterator<Item = TreeNode<K, T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<K, T> Forest<K, T> {
    /// Wrap a list of roots.
    pub fn new(roots: Vec<TreeNode<K, T>>) -> Self {
        Self {
            roots: roots.into(),
        }
    }

    /// The root nodes, in order.
    pub fn roots(&self) -> &[TreeNode<K, T>] {
        &self.roots
    }

    /// Whether the forest has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether two handles refer to the same forest allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.roots, &b.roots)
    }
}

/// Derived checkbox state of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// Neither the node nor (for branches) any descendant is checked.
    Unchecked,
    /// The node is checked; for branches, every descendant is checked.
    Checked,
    /// Some but not all descendants are checked. Never stored, only derived.
    Indeterminate,
}

impl CheckState {
    /// Whether a checkbox should render as checked.
    pub fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }

    /// Whether a checkbox should render as indeterminate.
    pub fn is_indeterminate(self) -> bool {
        matches!(self, Self::Indeterminate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn leaf_inference_honors_override() {
        let plain = TreeNode::new("a", "A");
        assert!(plain.is_leaf());

        let lazy = TreeNode::new("b", "B").with_leaf(false);
        assert!(!lazy.is_leaf());
        assert!(!lazy.has_children());

        let branch = TreeNode::new("c", "C").with_children([TreeNode::new("d", "D")]);
        assert!(!branch.is_leaf());
    }

    #[test]
    fn disabled_nodes_refuse_intents() {
        let node = TreeNode::new("a", "A").disabled();
        assert!(!node.can_select());
        assert!(!node.can_check());
        assert!(node.checkbox_locked());

        let boxed = TreeNode::new("b", "B")
            .with_flags(NodeFlags::default() | NodeFlags::CHECKBOX_DISABLED);
        assert!(boxed.can_select());
        assert!(!boxed.can_check());
    }

    #[test]
    fn forest_clone_preserves_identity() {
        let forest = Forest::new(vec![TreeNode::new(1_u32, "one")]);
        let same = forest.clone();
        let other = Forest::new(vec![TreeNode::new(1_u32, "one")]);
        assert!(Forest::ptr_eq(&forest, &same));
        assert!(!Forest::ptr_eq(&forest, &other));
    }
}
