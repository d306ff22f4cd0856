// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options for [`TreeSelect`](crate::TreeSelect).

use alloc::string::String;
use alloc::vec::Vec;

use understory_tree_state::KeySet;

/// Which checked keys are shown as tags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShowCheckedStrategy {
    /// Every key in the value.
    #[default]
    All,
    /// Keys none of whose ancestors are in the value.
    Parent,
    /// Leaf keys only.
    Child,
}

/// Construction options for a tree select.
#[derive(Clone, Debug)]
pub struct TreeSelectConfig<K> {
    /// Allow more than one value without checkboxes.
    pub multiple: bool,
    /// Show checkboxes; implies a multi-valued result.
    pub tree_checkable: bool,
    /// Checkboxes are independent of each other.
    pub tree_check_strictly: bool,
    /// Which values become tags.
    pub show_checked_strategy: ShowCheckedStrategy,
    /// Upper bound on the number of values.
    pub max_count: Option<usize>,
    /// Upper bound on the number of tags shown; the rest are counted.
    pub max_tag_count: Option<usize>,
    /// Start with every node expanded.
    pub tree_default_expand_all: bool,
    /// Initially expanded keys.
    pub tree_default_expanded_keys: Vec<K>,
    /// Host-owned expanded set.
    pub tree_expanded_keys: Option<KeySet<K>>,
    /// Initial value.
    pub default_value: Vec<K>,
    /// Host-owned value.
    pub value: Option<KeySet<K>>,
    /// Host-owned search query.
    pub search: Option<String>,
}

impl<K> Default for TreeSelectConfig<K> {
    fn default() -> Self {
        Self {
            multiple: false,
            tree_checkable: false,
            tree_check_strictly: false,
            show_checked_strategy: ShowCheckedStrategy::All,
            max_count: None,
            max_tag_count: None,
            tree_default_expand_all: false,
            tree_default_expanded_keys: Vec::new(),
            tree_expanded_keys: None,
            default_value: Vec::new(),
            value: None,
            search: None,
        }
    }
}

impl<K> TreeSelectConfig<K> {
    /// Whether the value holds any number of keys.
    pub fn is_multi_valued(&self) -> bool {
        self.multiple || self.tree_checkable
    }

    /// Allow multiple values.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Show checkboxes.
    pub fn with_tree_checkable(mut self, checkable: bool) -> Self {
        self.tree_checkable = checkable;
        self
    }

    /// Decouple parent and child checkboxes.
    pub fn with_tree_check_strictly(mut self, strict: bool) -> Self {
        self.tree_check_strictly = strict;
        self
    }

    /// Choose which values become tags.
    pub fn with_show_checked_strategy(mut self, strategy: ShowCheckedStrategy) -> Self {
        self.show_checked_strategy = strategy;
        self
    }

    /// Limit the number of values.
    pub fn with_max_count(mut self, max: usize) -> Self {
        self.max_count = Some(max);
        self
    }

    /// Limit the number of tags shown.
    pub fn with_max_tag_count(mut self, max: usize) -> Self {
        self.max_tag_count = Some(max);
        self
    }

    /// Start fully expanded.
    pub fn with_tree_default_expand_all(mut self, expand_all: bool) -> Self {
        self.tree_default_expand_all = expand_all;
        self
    }

    /// Seed the expanded set.
    pub fn with_tree_default_expanded_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.tree_default_expanded_keys = keys.into_iter().collect();
        self
    }

    /// Hand the expanded set to the host.
    pub fn with_tree_expanded_keys(mut self, keys: KeySet<K>) -> Self {
        self.tree_expanded_keys = Some(keys);
        self
    }

    /// Seed the value.
    pub fn with_default_value(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_value = keys.into_iter().collect();
        self
    }

    /// Hand the value to the host.
    pub fn with_value(mut self, keys: KeySet<K>) -> Self {
        self.value = Some(keys);
        self
    }

    /// Hand the search query to the host.
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }
}
