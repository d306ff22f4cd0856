// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized values and the events that report them.

use alloc::vec::Vec;
use core::hash::Hash;

use understory_tree_state::{KeySet, TreeNode};

/// The value of a tree select, shaped by its mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectValue<K> {
    /// Single mode: at most one key.
    Single(Option<K>),
    /// Multiple or checkable mode: keys in the order they were picked.
    Multiple(Vec<K>),
}

impl<K: Clone + Eq + Hash> SelectValue<K> {
    pub(crate) fn from_keys(keys: &KeySet<K>, multi: bool) -> Self {
        if multi {
            Self::Multiple(keys.iter().cloned().collect())
        } else {
            Self::Single(keys.iter().next().cloned())
        }
    }

    /// Whether no key is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(key) => key.is_none(),
            Self::Multiple(keys) => keys.is_empty(),
        }
    }
}

/// Reported whenever the value changes.
#[derive(Clone, Debug)]
pub struct ChangeEvent<'a, K, T> {
    /// The proposed value.
    pub value: SelectValue<K>,
    /// The proposed value as a key set.
    pub keys: KeySet<K>,
    /// Titles of the value's keys, in value order; `None` for keys not in the forest.
    pub labels: Vec<Option<&'a T>>,
    /// The node whose intent caused the change; `None` for clear and tag removal.
    pub trigger: Option<&'a TreeNode<K, T>>,
}

/// Tags to render for the current value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayTags<'a, K> {
    /// Keys to show, in value order.
    pub keys: Vec<&'a K>,
    /// How many further keys were truncated by `max_tag_count`.
    pub hidden: usize,
}
