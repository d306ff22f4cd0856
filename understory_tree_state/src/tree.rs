// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree browser host: the controllers composed behind one intent surface.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use crate::check::{CheckEvent, CheckMode, Checks, conduct_keys};
use crate::expansion::{ExpandEvent, Expansion, ExpansionSeed};
use crate::index::{IndexError, TreeIndex};
use crate::keys::KeySet;
use crate::selection::{SelectEvent, SelectRules, Selection, SelectionMode};
use crate::types::{CheckState, Forest};
use crate::visible::{Navigation, VisibleRow, WrapMode, navigate, visible_rows};

/// Construction options for [`TreeState`].
///
/// The `default_*` lists seed engine-owned sets. Supplying one of the
/// controlled sets (`expanded_keys`, `selected_keys`, `checked_keys`) hands
/// that set to the host instead; see [`Authority`](crate::Authority).
#[derive(Clone, Debug)]
pub struct TreeConfig<K> {
    /// Nodes show checkboxes and accept check intents.
    pub checkable: bool,
    /// Nodes accept select intents.
    pub selectable: bool,
    /// More than one node may be selected.
    pub multiple: bool,
    /// Checkboxes are independent of each other.
    pub check_strictly: bool,
    /// Start with every node expanded.
    pub expand_all: bool,
    /// Expand the ancestors of the default expanded keys.
    pub auto_expand_parent: bool,
    /// Initially expanded keys.
    pub default_expanded_keys: Vec<K>,
    /// Initially selected keys.
    pub default_selected_keys: Vec<K>,
    /// Initially checked keys, conducted unless `check_strictly`.
    pub default_checked_keys: Vec<K>,
    /// Host-owned expanded set.
    pub expanded_keys: Option<KeySet<K>>,
    /// Host-owned selected set.
    pub selected_keys: Option<KeySet<K>>,
    /// Host-owned checked set.
    pub checked_keys: Option<KeySet<K>>,
}

impl<K> Default for TreeConfig<K> {
    fn default() -> Self {
        Self {
            checkable: false,
            selectable: true,
            multiple: false,
            check_strictly: false,
            expand_all: false,
            auto_expand_parent: true,
            default_expanded_keys: Vec::new(),
            default_selected_keys: Vec::new(),
            default_checked_keys: Vec::new(),
            expanded_keys: None,
            selected_keys: None,
            checked_keys: None,
        }
    }
}

impl<K> TreeConfig<K> {
    /// Enable or disable checkboxes.
    pub fn with_checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    /// Enable or disable selection.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Allow multiple selected nodes.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Decouple parent and child checkboxes.
    pub fn with_check_strictly(mut self, strict: bool) -> Self {
        self.check_strictly = strict;
        self
    }

    /// Start fully expanded.
    pub fn with_expand_all(mut self, expand_all: bool) -> Self {
        self.expand_all = expand_all;
        self
    }

    /// Expand the ancestors of seeded keys.
    pub fn with_auto_expand_parent(mut self, auto: bool) -> Self {
        self.auto_expand_parent = auto;
        self
    }

    /// Seed the expanded set.
    pub fn with_default_expanded_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_expanded_keys = keys.into_iter().collect();
        self
    }

    /// Seed the selected set.
    pub fn with_default_selected_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_selected_keys = keys.into_iter().collect();
        self
    }

    /// Seed the checked set.
    pub fn with_default_checked_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_checked_keys = keys.into_iter().collect();
        self
    }

    /// Hand the expanded set to the host.
    pub fn with_expanded_keys(mut self, keys: KeySet<K>) -> Self {
        self.expanded_keys = Some(keys);
        self
    }

    /// Hand the selected set to the host.
    pub fn with_selected_keys(mut self, keys: KeySet<K>) -> Self {
        self.selected_keys = Some(keys);
        self
    }

    /// Hand the checked set to the host.
    pub fn with_checked_keys(mut self, keys: KeySet<K>) -> Self {
        self.checked_keys = Some(keys);
        self
    }
}

/// Keyboard intents understood by [`TreeState::navigate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeKey {
    /// Focus the next visible row.
    Down,
    /// Focus the previous visible row.
    Up,
    /// Expand a collapsed branch, or focus the first child of an expanded one.
    Right,
    /// Collapse an expanded branch, or focus the parent.
    Left,
    /// Focus the first row.
    Home,
    /// Focus the last row.
    End,
    /// Check, select, or expand the focused node, in that order of preference.
    Activate,
}

type ExpandHandler<K, T> = Box<dyn FnMut(&ExpandEvent<'_, K, T>)>;
type SelectHandler<K, T> = Box<dyn FnMut(&SelectEvent<'_, K, T>)>;
type CheckHandler<K, T> = Box<dyn FnMut(&CheckEvent<'_, K, T>)>;

/// State engine for a tree browser.
///
/// Intents are applied to the relevant controller and reported to the
/// registered handler synchronously, before the intent method returns.
///
/// ```rust
/// use understory_tree_state::{CheckState, Forest, TreeConfig, TreeNode, TreeState};
///
/// let forest = Forest::new(vec![TreeNode::new("a", "A").with_children([
///     TreeNode::new("b", "B"),
///     TreeNode::new("c", "C"),
/// ])]);
/// let mut tree = TreeState::new(forest, TreeConfig::default().with_checkable(true)).unwrap();
///
/// tree.check(&"b");
/// assert_eq!(tree.state_of(&"a"), CheckState::Indeterminate);
/// tree.check(&"c");
/// assert_eq!(tree.state_of(&"a"), CheckState::Checked);
/// ```
pub struct TreeState<K, T> {
    index: TreeIndex<K, T>,
    expansion: Expansion<K>,
    selection: Selection<K>,
    checks: Checks<K>,
    checkable: bool,
    selectable: bool,
    focused: Option<K>,
    on_expand: Option<ExpandHandler<K, T>>,
    on_select: Option<SelectHandler<K, T>>,
    on_check: Option<CheckHandler<K, T>>,
}

impl<K: fmt::Debug, T: fmt::Debug> fmt::Debug for TreeState<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeState")
            .field("index", &self.index)
            .field("expansion", &self.expansion)
            .field("selection", &self.selection)
            .field("checks", &self.checks)
            .field("checkable", &self.checkable)
            .field("selectable", &self.selectable)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl<K, T> TreeState<K, T>
where
    K: Clone + Eq + Hash + 'static,
    T: 'static,
{
    /// Index `forest` and resolve each state set from `config`.
    pub fn new(forest: Forest<K, T>, config: TreeConfig<K>) -> Result<Self, IndexError<K>> {
        let index = TreeIndex::build(forest)?;
        let seed = ExpansionSeed {
            keys: &config.default_expanded_keys,
            expand_all: config.expand_all,
            auto_expand_parent: config.auto_expand_parent,
        };
        let expansion = Expansion::resolve(config.expanded_keys, || seed.resolve(&index));

        let mode = if config.multiple {
            SelectionMode::Multiple
        } else {
            SelectionMode::Single
        };
        let rules = SelectRules::new(mode);
        let selection = Selection::resolve(rules, config.selected_keys, || {
            let keys = config.default_selected_keys.iter().cloned();
            match mode {
                SelectionMode::Multiple => keys.collect(),
                SelectionMode::Single => keys.take(1).collect(),
            }
        });

        let check_mode = if config.check_strictly {
            CheckMode::Strict
        } else {
            CheckMode::Conducted
        };
        let checks = Checks::resolve(check_mode, config.checked_keys, || {
            conduct_keys(&index, &config.default_checked_keys, check_mode)
        });

        Ok(Self {
            index,
            expansion,
            selection,
            checks,
            checkable: config.checkable,
            selectable: config.selectable,
            focused: None,
            on_expand: None,
            on_select: None,
            on_check: None,
        })
    }

    /// Replace the forest, rebuilding the index only if its identity changed.
    ///
    /// On error the previous forest stays in effect. Keys that disappear stay
    /// in the state sets; intents on them are ignored as stale.
    pub fn set_forest(&mut self, forest: Forest<K, T>) -> Result<(), IndexError<K>> {
        if self.index.is_current(&forest) {
            return Ok(());
        }
        self.index = TreeIndex::build(forest)?;
        if self
            .focused
            .as_ref()
            .is_some_and(|key| !self.index.contains(key))
        {
            self.focused = None;
        }
        Ok(())
    }

    /// The current index.
    pub fn index(&self) -> &TreeIndex<K, T> {
        &self.index
    }

    /// Called with every accepted expand intent.
    pub fn on_expand(&mut self, handler: impl FnMut(&ExpandEvent<'_, K, T>) + 'static) {
        self.on_expand = Some(Box::new(handler));
    }

    /// Called with every accepted select intent.
    pub fn on_select(&mut self, handler: impl FnMut(&SelectEvent<'_, K, T>) + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    /// Called with every accepted check intent.
    pub fn on_check(&mut self, handler: impl FnMut(&CheckEvent<'_, K, T>) + 'static) {
        self.on_check = Some(Box::new(handler));
    }

    // --- intents ---

    /// Flip the expansion of `key`; returns the proposed expanded set.
    pub fn toggle_expand(&mut self, key: &K) -> Option<KeySet<K>> {
        let expanded = !self.expansion.is_expanded(key);
        self.set_expanded(key, expanded)
    }

    /// Expand or collapse `key`; returns the proposed expanded set.
    pub fn set_expanded(&mut self, key: &K, expanded: bool) -> Option<KeySet<K>> {
        let event = self.expansion.set_expanded(&self.index, key, expanded)?;
        if let Some(handler) = self.on_expand.as_mut() {
            handler(&event);
        }
        Some(event.keys)
    }

    /// Select intent on `key`; returns the proposed selected set.
    pub fn select(&mut self, key: &K) -> Option<KeySet<K>> {
        if !self.selectable {
            log::debug!("select intent ignored: tree is not selectable");
            return None;
        }
        let event = self.selection.select(&self.index, key)?;
        if let Some(handler) = self.on_select.as_mut() {
            handler(&event);
        }
        Some(event.keys)
    }

    /// Checkbox click on `key`; returns the proposed checked set.
    pub fn check(&mut self, key: &K) -> Option<KeySet<K>> {
        let checked = !self.checks.keys().contains(key);
        self.set_checked(key, checked)
    }

    /// Set `key` to `checked`; returns the proposed checked set.
    pub fn set_checked(&mut self, key: &K, checked: bool) -> Option<KeySet<K>> {
        if !self.checkable {
            log::debug!("check intent ignored: tree is not checkable");
            return None;
        }
        let event = self.checks.set_checked(&self.index, key, checked)?;
        if let Some(handler) = self.on_check.as_mut() {
            handler(&event);
        }
        Some(event.keys)
    }

    /// Move keyboard focus to `key`; returns `false` for stale keys.
    pub fn focus(&mut self, key: &K) -> bool {
        if !self.index.contains(key) {
            return false;
        }
        self.focused = Some(key.clone());
        true
    }

    /// Apply a keyboard intent; returns the focused key afterwards.
    pub fn navigate(&mut self, intent: TreeKey) -> Option<&K> {
        let branch = self
            .focused
            .as_ref()
            .filter(|key| self.index.is_leaf(key) == Some(false))
            .map(|key| (key.clone(), self.expansion.is_expanded(key)));
        let direction = match (intent, branch) {
            (TreeKey::Down, _) => Navigation::Next,
            (TreeKey::Up, _) => Navigation::Prev,
            (TreeKey::Home, _) => Navigation::First,
            (TreeKey::End, _) => Navigation::Last,
            (TreeKey::Right, Some((key, false))) => {
                self.set_expanded(&key, true);
                return self.focused.as_ref();
            }
            (TreeKey::Right, _) => Navigation::FirstChild,
            (TreeKey::Left, Some((key, true))) => {
                self.set_expanded(&key, false);
                return self.focused.as_ref();
            }
            (TreeKey::Left, _) => Navigation::Parent,
            (TreeKey::Activate, _) => {
                if let Some(key) = self.focused.clone() {
                    self.activate(&key);
                }
                return self.focused.as_ref();
            }
        };
        let rows = visible_rows(&self.index, self.expansion.keys());
        if let Some(next) = navigate(&rows, self.focused.as_ref(), direction, WrapMode::Never) {
            self.focused = Some(next.clone());
        }
        self.focused.as_ref()
    }

    fn activate(&mut self, key: &K) {
        let Some(node) = self.index.find(key) else {
            return;
        };
        if self.checkable && node.can_check() {
            self.check(key);
        } else if self.selectable && node.can_select() {
            self.select(key);
        } else {
            self.toggle_expand(key);
        }
    }

    // --- queries ---

    /// Whether `key` is expanded.
    pub fn is_expanded(&self, key: &K) -> bool {
        self.expansion.is_expanded(key)
    }

    /// Whether `key` is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selection.is_selected(key)
    }

    /// Derived checkbox state of `key`.
    pub fn state_of(&self, key: &K) -> CheckState {
        self.checks.state_of(&self.index, key)
    }

    /// The expanded set.
    pub fn expanded_keys(&self) -> &KeySet<K> {
        self.expansion.keys()
    }

    /// The selected set.
    pub fn selected_keys(&self) -> &KeySet<K> {
        self.selection.keys()
    }

    /// The canonical checked set.
    pub fn checked_keys(&self) -> &KeySet<K> {
        self.checks.keys()
    }

    /// Rows to render, in order.
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_, K, T>> {
        visible_rows(&self.index, self.expansion.keys())
    }

    /// The key holding keyboard focus.
    pub fn focused(&self) -> Option<&K> {
        self.focused.as_ref()
    }

    // --- controlled feedback ---

    /// Feed back the host-owned expanded set.
    pub fn sync_expanded(&mut self, keys: KeySet<K>) {
        self.expansion.sync(keys);
    }

    /// Feed back the host-owned selected set.
    pub fn sync_selected(&mut self, keys: KeySet<K>) {
        self.selection.sync(keys);
    }

    /// Feed back the host-owned checked set.
    pub fn sync_checked(&mut self, keys: KeySet<K>) {
        self.checks.sync(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TreeNode;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    fn forest() -> Forest<&'static str, &'static str> {
        Forest::new(vec![
            TreeNode::new("A", "A").with_children([
                TreeNode::new("B", "B"),
                TreeNode::new("C", "C"),
            ]),
            TreeNode::new("D", "D").with_children([TreeNode::new("E", "E")]),
        ])
    }

    #[test]
    fn check_scenario_reports_synchronously() {
        let mut tree = TreeState::new(forest(), TreeConfig::default().with_checkable(true)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tree.on_check(move |event| sink.borrow_mut().push((event.node.key, event.checked)));

        tree.set_checked(&"A", true);
        assert_eq!(*seen.borrow(), vec![("A", true)]);
        assert_eq!(
            *tree.checked_keys(),
            ["A", "B", "C"].into_iter().collect::<KeySet<_>>()
        );
    }

    #[test]
    fn leaf_expand_fires_nothing() {
        let mut tree = TreeState::new(forest(), TreeConfig::default()).unwrap();
        let fired = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&fired);
        tree.on_expand(move |_| *counter.borrow_mut() += 1);

        let before = tree.expanded_keys().clone();
        assert!(tree.toggle_expand(&"B").is_none());
        assert_eq!(*fired.borrow(), 0);
        assert!(KeySet::ptr_eq(&before, tree.expanded_keys()));

        tree.toggle_expand(&"A");
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn global_flags_gate_intents() {
        let config = TreeConfig::default().with_selectable(false);
        let mut tree = TreeState::new(forest(), config).unwrap();
        assert!(tree.select(&"B").is_none());
        assert!(tree.check(&"B").is_none());
    }

    #[test]
    fn seeds_expand_parents_and_conduct_checks() {
        let config = TreeConfig::default()
            .with_default_expanded_keys(["B"])
            .with_default_checked_keys(["B", "C"])
            .with_default_selected_keys(["E", "D"]);
        let tree = TreeState::new(forest(), config).unwrap();
        assert!(tree.is_expanded(&"A"));
        assert!(tree.checked_keys().contains(&"A"));
        assert_eq!(tree.selected_keys().as_slice(), &["E"]);
    }

    #[test]
    fn expand_all_seed() {
        let tree = TreeState::new(forest(), TreeConfig::default().with_expand_all(true)).unwrap();
        assert_eq!(tree.visible_rows().len(), 5);
    }

    #[test]
    fn controlled_sets_wait_for_sync() {
        let config = TreeConfig::default().with_selected_keys(KeySet::new());
        let mut tree = TreeState::new(forest(), config).unwrap();
        let proposed = tree.select(&"B").unwrap();
        assert!(!tree.is_selected(&"B"));
        tree.sync_selected(proposed);
        assert!(tree.is_selected(&"B"));
    }

    #[test]
    fn same_forest_keeps_index() {
        let forest = forest();
        let mut tree = TreeState::new(forest.clone(), TreeConfig::default()).unwrap();
        tree.set_forest(forest.clone()).unwrap();
        assert!(tree.index().is_current(&forest));

        let dup = Forest::new(vec![TreeNode::new("A", "A"), TreeNode::new("A", "again")]);
        assert_eq!(tree.set_forest(dup), Err(IndexError::DuplicateKey("A")));
        assert!(tree.index().is_current(&forest));
    }

    #[test]
    fn stale_focus_is_dropped_on_forest_change() {
        let mut tree = TreeState::new(forest(), TreeConfig::default()).unwrap();
        assert!(tree.focus(&"D"));
        tree.set_forest(Forest::new(vec![TreeNode::new("A", "A")])).unwrap();
        assert_eq!(tree.focused(), None);
        assert!(!tree.focus(&"D"));
    }

    #[test]
    fn keyboard_walks_the_tree() {
        let mut tree = TreeState::new(forest(), TreeConfig::default()).unwrap();
        assert_eq!(tree.navigate(TreeKey::Down), Some(&"A"));
        assert_eq!(tree.navigate(TreeKey::Right), Some(&"A"));
        assert!(tree.is_expanded(&"A"));
        assert_eq!(tree.navigate(TreeKey::Right), Some(&"B"));
        assert_eq!(tree.navigate(TreeKey::Left), Some(&"A"));
        assert_eq!(tree.navigate(TreeKey::Left), Some(&"A"));
        assert!(!tree.is_expanded(&"A"));
        assert_eq!(tree.navigate(TreeKey::End), Some(&"D"));
        assert_eq!(tree.navigate(TreeKey::Down), Some(&"D"));
        assert_eq!(tree.navigate(TreeKey::Home), Some(&"A"));
        assert_eq!(tree.navigate(TreeKey::Up), Some(&"A"));
    }

    #[test]
    fn activate_prefers_check_then_select() {
        let mut tree = TreeState::new(forest(), TreeConfig::default().with_checkable(true)).unwrap();
        tree.focus(&"E");
        tree.navigate(TreeKey::Activate);
        assert!(tree.checked_keys().contains(&"E"));
        assert!(!tree.is_selected(&"E"));

        let mut tree = TreeState::new(forest(), TreeConfig::default()).unwrap();
        tree.focus(&"E");
        tree.navigate(TreeKey::Activate);
        assert!(tree.is_selected(&"E"));
    }
}
