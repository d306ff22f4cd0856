// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Check propagation: tri-state checkboxes over the forest.
//!
//! In [`CheckMode::Conducted`] a check intent flows down to every descendant
//! and back up through the ancestors:
//!
//! 1. The target and its descendants are inserted (or removed).
//! 2. Each ancestor, nearest first, is inserted iff every direct child is
//!    fully checked. A child is fully checked when it is in the set, or when
//!    it is a branch whose descendants are all in the set.
//!
//! A locked checkbox (disabled, checkbox-disabled, or lacking
//! [`NodeFlags::CHECKABLE`]) only refuses intents that target it. Propagation
//! from a neighbor still reaches it in both directions.
//!
//! [`NodeFlags::CHECKABLE`]: crate::NodeFlags::CHECKABLE

use core::hash::Hash;

use crate::authority::{Authority, Controlled};
use crate::index::TreeIndex;
use crate::keys::{KeySet, KeySetEdit};
use crate::types::{CheckState, TreeNode};

/// How check intents relate parents and children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// Parents and children are linked by tri-state propagation.
    #[default]
    Conducted,
    /// Each checkbox is independent; no node is ever indeterminate.
    Strict,
}

/// Reported when a check intent is accepted.
#[derive(Clone, Debug)]
pub struct CheckEvent<'a, K, T> {
    /// The proposed checked set.
    pub keys: KeySet<K>,
    /// The node the intent targeted.
    pub node: &'a TreeNode<K, T>,
    /// The requested direction.
    pub checked: bool,
}

/// Compute the checked set after setting `key` to `checked`.
///
/// Returns `None` for stale keys and nodes whose checkbox is locked. When the
/// membership does not change, the event carries `keys` itself.
pub fn propose_checked<'a, K, T>(
    index: &'a TreeIndex<K, T>,
    keys: &KeySet<K>,
    key: &K,
    checked: bool,
    mode: CheckMode,
) -> Option<CheckEvent<'a, K, T>>
where
    K: Clone + Eq + Hash,
{
    let Some(slot) = index.slot_of(key) else {
        log::debug!("check intent ignored: key is not in the forest");
        return None;
    };
    let node = index.node_at(slot);
    if !node.can_check() {
        log::debug!("check intent ignored: checkbox is locked");
        return None;
    }
    let next = match mode {
        CheckMode::Strict if checked => keys.with(key.clone()),
        CheckMode::Strict => keys.without(key),
        CheckMode::Conducted => {
            let conducted = conduct(index, keys, slot, checked);
            if conducted == *keys {
                keys.clone()
            } else {
                conducted
            }
        }
    };
    Some(CheckEvent {
        keys: next,
        node,
        checked,
    })
}

fn conduct<K, T>(index: &TreeIndex<K, T>, keys: &KeySet<K>, slot: usize, checked: bool) -> KeySet<K>
where
    K: Clone + Eq + Hash,
{
    let mut edit = keys.edit();
    let set = |edit: &mut KeySetEdit<K>, key: &K| {
        if checked {
            edit.insert(key.clone());
        } else {
            edit.remove(key);
        }
    };

    set(&mut edit, &index.entry(slot).key);
    for below in index.descendant_slots(slot) {
        set(&mut edit, &index.entry(below).key);
    }

    for ancestor in index.ancestor_slots_from(index.entry(slot).parent) {
        let entry = index.entry(ancestor);
        let full = index
            .child_slots(ancestor)
            .all(|child| fully_checked(index, &edit, child));
        if full {
            edit.insert(entry.key.clone());
        } else {
            edit.remove(&entry.key);
        }
    }
    edit.finish()
}

fn fully_checked<K, T>(index: &TreeIndex<K, T>, edit: &KeySetEdit<K>, slot: usize) -> bool
where
    K: Clone + Eq + Hash,
{
    let entry = index.entry(slot);
    if edit.contains(&entry.key) {
        return true;
    }
    entry.has_children(slot)
        && index
            .descendant_slots(slot)
            .all(|d| edit.contains(&index.entry(d).key))
}

/// Derive the tri-state of `key` from `keys`.
///
/// Stale keys read as [`CheckState::Unchecked`].
pub fn check_state<K, T>(
    index: &TreeIndex<K, T>,
    keys: &KeySet<K>,
    key: &K,
    mode: CheckMode,
) -> CheckState
where
    K: Clone + Eq + Hash,
{
    let Some(slot) = index.slot_of(key) else {
        return CheckState::Unchecked;
    };
    let own = if keys.contains(key) {
        CheckState::Checked
    } else {
        CheckState::Unchecked
    };
    let below = index.descendant_slots(slot);
    if mode == CheckMode::Strict || below.is_empty() {
        return own;
    }
    let total = below.len();
    let checked = below
        .filter(|&d| keys.contains(&index.entry(d).key))
        .count();
    if checked == total {
        CheckState::Checked
    } else if checked == 0 {
        own
    } else {
        CheckState::Indeterminate
    }
}

/// Build a checked set from `keys`, conducting each one in turn.
///
/// Seeds are conducted even when their own checkbox is locked. Keys that are
/// not in the forest are taken as given.
pub fn conduct_keys<K, T>(index: &TreeIndex<K, T>, keys: &[K], mode: CheckMode) -> KeySet<K>
where
    K: Clone + Eq + Hash,
{
    if mode == CheckMode::Strict {
        return keys.iter().cloned().collect();
    }
    keys.iter()
        .fold(KeySet::new(), |acc, key| match index.slot_of(key) {
            Some(slot) => conduct(index, &acc, slot, true),
            None => acc.with(key.clone()),
        })
}

/// Owns the checked-key set of one tree view.
#[derive(Clone, Debug)]
pub struct Checks<K> {
    keys: Controlled<KeySet<K>>,
    mode: CheckMode,
}

impl<K> Checks<K>
where
    K: Clone + Eq + Hash,
{
    /// Engine-owned checks starting from `initial`.
    ///
    /// The initial set is taken as given; it is not re-conducted.
    pub fn new(mode: CheckMode, initial: KeySet<K>) -> Self {
        Self {
            keys: Controlled::internal(initial),
            mode,
        }
    }

    /// Host-owned checks.
    pub fn controlled(mode: CheckMode, keys: KeySet<K>) -> Self {
        Self {
            keys: Controlled::external(keys),
            mode,
        }
    }

    /// Engine-owned unless `external` is supplied.
    pub fn resolve(
        mode: CheckMode,
        external: Option<KeySet<K>>,
        initial: impl FnOnce() -> KeySet<K>,
    ) -> Self {
        Self {
            keys: Controlled::resolve(external, initial),
            mode,
        }
    }

    /// The propagation mode.
    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Who owns the checked set.
    pub fn authority(&self) -> Authority {
        self.keys.authority()
    }

    /// The canonical checked set.
    pub fn keys(&self) -> &KeySet<K> {
        self.keys.get()
    }

    /// Derived tri-state of `key`.
    pub fn state_of<T>(&self, index: &TreeIndex<K, T>, key: &K) -> CheckState {
        check_state(index, self.keys.get(), key, self.mode)
    }

    /// Feed back a host-owned value.
    pub fn sync(&mut self, keys: KeySet<K>) {
        self.keys.sync(keys);
    }

    /// Checkbox click: check `key` unless it is already a member.
    pub fn toggle<'a, T>(
        &mut self,
        index: &'a TreeIndex<K, T>,
        key: &K,
    ) -> Option<CheckEvent<'a, K, T>> {
        let checked = !self.keys.get().contains(key);
        self.set_checked(index, key, checked)
    }

    /// Set `key` (and, when conducted, its subtree) to `checked`.
    pub fn set_checked<'a, T>(
        &mut self,
        index: &'a TreeIndex<K, T>,
        key: &K,
        checked: bool,
    ) -> Option<CheckEvent<'a, K, T>> {
        let event = propose_checked(index, self.keys.get(), key, checked, self.mode)?;
        if self.keys.propose(event.keys.clone()) {
            log::trace!("checks committed ({} checked)", event.keys.len());
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Forest, NodeFlags};
    use alloc::vec;

    fn abc() -> TreeIndex<&'static str, &'static str> {
        TreeIndex::build(Forest::new(vec![TreeNode::new("A", "A").with_children([
            TreeNode::new("B", "B"),
            TreeNode::new("C", "C"),
        ])]))
        .unwrap()
    }

    fn set(keys: &[&'static str]) -> KeySet<&'static str> {
        keys.iter().copied().collect()
    }

    #[test]
    fn checking_children_completes_parent() {
        let index = abc();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());

        checks.set_checked(&index, &"B", true).unwrap();
        assert_eq!(*checks.keys(), set(&["B"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Indeterminate);

        checks.set_checked(&index, &"C", true).unwrap();
        assert_eq!(*checks.keys(), set(&["A", "B", "C"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Checked);
    }

    #[test]
    fn checking_parent_conducts_down() {
        let index = abc();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());
        let event = checks.set_checked(&index, &"A", true).unwrap();
        assert!(event.checked);
        assert_eq!(event.node.key, "A");
        assert_eq!(*checks.keys(), set(&["A", "B", "C"]));
    }

    #[test]
    fn unchecking_child_clears_parent() {
        let index = abc();
        let mut checks = Checks::new(CheckMode::Conducted, set(&["A", "B", "C"]));
        checks.toggle(&index, &"B").unwrap();
        assert_eq!(*checks.keys(), set(&["C"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Indeterminate);
        assert_eq!(checks.state_of(&index, &"B"), CheckState::Unchecked);
    }

    #[test]
    fn propagation_reaches_every_level() {
        let index = TreeIndex::build(Forest::new(vec![TreeNode::new("r", "R").with_children([
            TreeNode::new("m", "M").with_children([TreeNode::new("x", "X")]),
            TreeNode::new("n", "N"),
        ])]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());
        checks.set_checked(&index, &"x", true).unwrap();
        assert_eq!(*checks.keys(), set(&["x", "m"]));
        checks.set_checked(&index, &"n", true).unwrap();
        assert_eq!(*checks.keys(), set(&["x", "m", "n", "r"]));
    }

    #[test]
    fn locked_nodes_refuse_intents_but_conduct() {
        let index = TreeIndex::build(Forest::new(vec![TreeNode::new("A", "A").with_children([
            TreeNode::new("B", "B"),
            TreeNode::new("C", "C").disabled(),
        ])]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());

        assert!(checks.toggle(&index, &"C").is_none());

        checks.set_checked(&index, &"A", true).unwrap();
        assert_eq!(*checks.keys(), set(&["A", "B", "C"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Checked);

        checks.set_checked(&index, &"B", false).unwrap();
        assert_eq!(*checks.keys(), set(&["C"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Indeterminate);
    }

    #[test]
    fn locked_branch_is_conducted_through() {
        let locked = NodeFlags::default() | NodeFlags::CHECKBOX_DISABLED;
        let index = TreeIndex::build(Forest::new(vec![TreeNode::new("r", "R").with_children([
            TreeNode::new("m", "M").with_flags(locked).with_children([TreeNode::new("x", "X")]),
            TreeNode::new("n", "N"),
        ])]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());

        checks.set_checked(&index, &"r", true).unwrap();
        assert_eq!(*checks.keys(), set(&["r", "m", "x", "n"]));

        // Unchecking below a locked ancestor still clears it and the root.
        checks.set_checked(&index, &"x", false).unwrap();
        assert_eq!(*checks.keys(), set(&["n"]));
        checks.set_checked(&index, &"x", true).unwrap();
        assert_eq!(*checks.keys(), set(&["n", "x", "m", "r"]));
    }

    #[test]
    fn lone_locked_child_follows_parent() {
        let index = TreeIndex::build(Forest::new(vec![
            TreeNode::new("A", "A").with_children([TreeNode::new("B", "B").disabled()]),
        ]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());
        checks.set_checked(&index, &"A", true).unwrap();
        assert_eq!(*checks.keys(), set(&["A", "B"]));
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Checked);
    }

    #[test]
    fn checkbox_disabled_child_counts_for_parent() {
        let locked = NodeFlags::default() | NodeFlags::CHECKBOX_DISABLED;
        let index = TreeIndex::build(Forest::new(vec![TreeNode::new("A", "A").with_children([
            TreeNode::new("B", "B"),
            TreeNode::new("C", "C").with_flags(locked),
        ])]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, set(&["C"]));
        checks.set_checked(&index, &"B", true).unwrap();
        assert_eq!(*checks.keys(), set(&["A", "B", "C"]));
        checks.set_checked(&index, &"A", false).unwrap();
        assert!(checks.keys().is_empty());
    }

    #[test]
    fn conduct_keys_completes_parents() {
        let index = abc();
        let keys = conduct_keys(&index, &["B", "C"], CheckMode::Conducted);
        assert_eq!(keys, set(&["A", "B", "C"]));
        let strict = conduct_keys(&index, &["A"], CheckMode::Strict);
        assert_eq!(strict, set(&["A"]));
        let stale = conduct_keys(&index, &["Z"], CheckMode::Conducted);
        assert_eq!(stale, set(&["Z"]));

        let locked = TreeIndex::build(Forest::new(vec![
            TreeNode::new("A", "A").disabled().with_children([TreeNode::new("B", "B")]),
        ]))
        .unwrap();
        let seeded = conduct_keys(&locked, &["A"], CheckMode::Conducted);
        assert_eq!(seeded, set(&["A", "B"]));
    }

    #[test]
    fn strict_mode_never_propagates() {
        let index = abc();
        let mut checks = Checks::new(CheckMode::Strict, KeySet::new());
        checks.set_checked(&index, &"A", true).unwrap();
        assert_eq!(*checks.keys(), set(&["A"]));
        assert_eq!(checks.state_of(&index, &"B"), CheckState::Unchecked);

        checks.set_checked(&index, &"B", true).unwrap();
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Checked);
        checks.set_checked(&index, &"A", false).unwrap();
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Unchecked);
    }

    #[test]
    fn unchanged_membership_keeps_identity() {
        let index = abc();
        let mut checks = Checks::new(CheckMode::Conducted, set(&["A", "B", "C"]));
        let before = checks.keys().clone();
        let event = checks.set_checked(&index, &"B", true).unwrap();
        assert!(KeySet::ptr_eq(&before, &event.keys));
    }

    #[test]
    fn stale_and_uncheckable_are_ignored() {
        let index = TreeIndex::build(Forest::new(vec![
            TreeNode::new("plain", "Plain").with_flags(NodeFlags::SELECTABLE),
        ]))
        .unwrap();
        let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());
        assert!(checks.toggle(&index, &"plain").is_none());
        assert!(checks.toggle(&index, &"ghost").is_none());
        assert_eq!(checks.state_of(&index, &"ghost"), CheckState::Unchecked);
    }

    #[test]
    fn controlled_checks_report_without_commit() {
        let index = abc();
        let mut checks = Checks::controlled(CheckMode::Conducted, KeySet::new());
        let event = checks.toggle(&index, &"A").unwrap();
        assert_eq!(event.keys, set(&["A", "B", "C"]));
        assert!(checks.keys().is_empty());
        checks.sync(event.keys);
        assert_eq!(checks.state_of(&index, &"A"), CheckState::Checked);
    }
}
