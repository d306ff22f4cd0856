// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection controller: single or multiple selected keys.

use core::hash::Hash;

use crate::authority::{Authority, Controlled};
use crate::index::TreeIndex;
use crate::keys::KeySet;
use crate::types::TreeNode;

/// Cardinality of the selected set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// At most one key is selected.
    #[default]
    Single,
    /// Any number of keys may be selected.
    Multiple,
}

/// Reported when a select intent is accepted.
#[derive(Clone, Debug)]
pub struct SelectEvent<'a, K, T> {
    /// The proposed selected set.
    pub keys: KeySet<K>,
    /// The node the intent targeted.
    pub node: &'a TreeNode<K, T>,
    /// Whether the node is selected afterwards.
    pub selected: bool,
}

/// Rules for turning a select intent into a new selected set.
///
/// ```rust
/// use understory_tree_state::{SelectRules, SelectionMode};
///
/// let rules = SelectRules::new(SelectionMode::Multiple).with_max_count(Some(3));
/// assert_eq!(rules.max_count(), Some(3));
/// assert!(rules.deselect());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectRules {
    mode: SelectionMode,
    deselect: bool,
    max_count: Option<usize>,
}

impl Default for SelectRules {
    fn default() -> Self {
        Self::new(SelectionMode::Single)
    }
}

impl SelectRules {
    /// Rules for `mode`, with toggle-to-deselect and no limit.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            deselect: true,
            max_count: None,
        }
    }

    /// Whether re-selecting the single selected key clears it.
    ///
    /// With `false`, re-selection keeps the key and reports `selected = true`.
    pub fn with_deselect(mut self, deselect: bool) -> Self {
        self.deselect = deselect;
        self
    }

    /// Reject multi-mode additions that would exceed `max_count` keys.
    pub fn with_max_count(mut self, max_count: Option<usize>) -> Self {
        self.max_count = max_count;
        self
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether re-selection deselects in single mode.
    pub fn deselect(&self) -> bool {
        self.deselect
    }

    /// The multi-mode limit, if any.
    pub fn max_count(&self) -> Option<usize> {
        self.max_count
    }

    /// Compute the selected set after a select intent on `key`.
    ///
    /// Returns `None` for stale keys, nodes that refuse selection, and
    /// additions over the limit.
    pub fn propose<'a, K, T>(
        &self,
        index: &'a TreeIndex<K, T>,
        keys: &KeySet<K>,
        key: &K,
    ) -> Option<SelectEvent<'a, K, T>>
    where
        K: Clone + Eq + Hash,
    {
        let Some(node) = index.find(key) else {
            log::debug!("select intent ignored: key is not in the forest");
            return None;
        };
        if !node.can_select() {
            log::debug!("select intent ignored: node is not selectable");
            return None;
        }
        let was_selected = keys.contains(key);
        let (next, selected) = match self.mode {
            SelectionMode::Single if was_selected && !self.deselect => (keys.clone(), true),
            SelectionMode::Single if was_selected => (KeySet::new(), false),
            SelectionMode::Single => (core::iter::once(key.clone()).collect(), true),
            SelectionMode::Multiple if was_selected => (keys.without(key), false),
            SelectionMode::Multiple => {
                if self.max_count.is_some_and(|max| keys.len() >= max) {
                    log::debug!("select intent ignored: max count reached");
                    return None;
                }
                (keys.with(key.clone()), true)
            }
        };
        Some(SelectEvent {
            keys: next,
            node,
            selected,
        })
    }
}

/// Owns the selected-key set of one tree view.
#[derive(Clone, Debug)]
pub struct Selection<K> {
    keys: Controlled<KeySet<K>>,
    rules: SelectRules,
}

impl<K> Selection<K>
where
    K: Clone + Eq + Hash,
{
    /// Engine-owned selection starting from `initial`.
    pub fn new(rules: SelectRules, initial: KeySet<K>) -> Self {
        Self {
            keys: Controlled::internal(initial),
            rules,
        }
    }

    /// Host-owned selection.
    pub fn controlled(rules: SelectRules, keys: KeySet<K>) -> Self {
        Self {
            keys: Controlled::external(keys),
            rules,
        }
    }

    /// Engine-owned unless `external` is supplied.
    pub fn resolve(
        rules: SelectRules,
        external: Option<KeySet<K>>,
        initial: impl FnOnce() -> KeySet<K>,
    ) -> Self {
        Self {
            keys: Controlled::resolve(external, initial),
            rules,
        }
    }

    /// The rules applied to select intents.
    pub fn rules(&self) -> &SelectRules {
        &self.rules
    }

    /// Who owns the selected set.
    pub fn authority(&self) -> Authority {
        self.keys.authority()
    }

    /// The current selected set.
    pub fn keys(&self) -> &KeySet<K> {
        self.keys.get()
    }

    /// Whether `key` is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.keys.get().contains(key)
    }

    /// Feed back a host-owned value.
    pub fn sync(&mut self, keys: KeySet<K>) {
        self.keys.sync(keys);
    }

    /// Apply a select intent on `key`.
    pub fn select<'a, T>(
        &mut self,
        index: &'a TreeIndex<K, T>,
        key: &K,
    ) -> Option<SelectEvent<'a, K, T>> {
        let event = self.rules.propose(index, self.keys.get(), key)?;
        if self.keys.propose(event.keys.clone()) {
            log::trace!("selection committed ({} selected)", event.keys.len());
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forest, NodeFlags};
    use alloc::vec;

    fn index() -> TreeIndex<&'static str, &'static str> {
        TreeIndex::build(Forest::new(vec![
            TreeNode::new("a", "A").with_children([
                TreeNode::new("b", "B"),
                TreeNode::new("c", "C"),
                TreeNode::new("d", "D"),
            ]),
            TreeNode::new("off", "Off").disabled(),
            TreeNode::new("label", "Label").with_flags(NodeFlags::CHECKABLE),
        ]))
        .unwrap()
    }

    #[test]
    fn single_mode_replaces_and_toggles_off() {
        let index = index();
        let mut selection = Selection::new(SelectRules::default(), KeySet::new());

        selection.select(&index, &"b").unwrap();
        let event = selection.select(&index, &"c").unwrap();
        assert!(event.selected);
        assert_eq!(selection.keys().as_slice(), &["c"]);

        let event = selection.select(&index, &"c").unwrap();
        assert!(!event.selected);
        assert!(selection.keys().is_empty());
    }

    #[test]
    fn single_mode_without_deselect_keeps_value() {
        let index = index();
        let rules = SelectRules::default().with_deselect(false);
        let mut selection = Selection::new(rules, KeySet::new());
        selection.select(&index, &"b").unwrap();
        let before = selection.keys().clone();
        let event = selection.select(&index, &"b").unwrap();
        assert!(event.selected);
        assert!(KeySet::ptr_eq(&before, selection.keys()));
    }

    #[test]
    fn multiple_mode_adds_and_removes() {
        let index = index();
        let rules = SelectRules::new(SelectionMode::Multiple);
        let mut selection = Selection::new(rules, KeySet::new());
        selection.select(&index, &"b").unwrap();
        selection.select(&index, &"a").unwrap();
        assert_eq!(selection.keys().as_slice(), &["b", "a"]);
        let event = selection.select(&index, &"b").unwrap();
        assert!(!event.selected);
        assert_eq!(selection.keys().as_slice(), &["a"]);
    }

    #[test]
    fn max_count_rejects_additions_only() {
        let index = index();
        let rules = SelectRules::new(SelectionMode::Multiple).with_max_count(Some(2));
        let mut selection = Selection::new(rules, KeySet::new());
        selection.select(&index, &"b").unwrap();
        selection.select(&index, &"c").unwrap();
        assert!(selection.select(&index, &"d").is_none());
        assert_eq!(selection.keys().len(), 2);
        assert!(selection.select(&index, &"b").is_some());
        assert_eq!(selection.keys().as_slice(), &["c"]);
    }

    #[test]
    fn policy_and_stale_keys_are_ignored() {
        let index = index();
        let mut selection = Selection::new(SelectRules::default(), KeySet::new());
        assert!(selection.select(&index, &"off").is_none());
        assert!(selection.select(&index, &"label").is_none());
        assert!(selection.select(&index, &"missing").is_none());
        assert!(selection.keys().is_empty());
    }

    #[test]
    fn controlled_selection_reports_without_commit() {
        let index = index();
        let mut selection = Selection::controlled(SelectRules::default(), KeySet::new());
        let event = selection.select(&index, &"d").unwrap();
        assert_eq!(event.keys.as_slice(), &["d"]);
        assert!(!selection.is_selected(&"d"));
        assert_eq!(selection.authority(), Authority::External);
    }
}
