// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The combo-select host.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use understory_tree_state::{
    CheckMode, CheckState, Controlled, Expansion, ExpansionSeed, FilterCache, Forest, IndexError,
    KeySet, Matcher, Navigation, SelectRules, SelectionMode, TitleContains, TreeIndex, TreeKey,
    VisibleRow, WrapMode, check_state, navigate, propose_checked, visible_rows,
};

use crate::config::{ShowCheckedStrategy, TreeSelectConfig};
use crate::value::{ChangeEvent, DisplayTags, SelectValue};

type ChangeHandler<K, T> = Box<dyn FnMut(&ChangeEvent<'_, K, T>)>;
type SearchHandler = Box<dyn FnMut(&str)>;
type ExpandHandler<K> = Box<dyn FnMut(&KeySet<K>)>;

/// State engine for a tree-based select control.
///
/// One value set backs both select and check intents. The dropdown shows the
/// forest filtered by the current search query; keys are always resolved
/// against the full forest, so values outside the current filter stay valid.
pub struct TreeSelect<K, T, M = TitleContains> {
    index: TreeIndex<K, T>,
    /// Index of the filtered forest; `None` while the query is empty.
    view: Option<TreeIndex<K, T>>,
    cache: FilterCache<K, T>,
    matcher: M,
    value: Controlled<KeySet<K>>,
    search: Controlled<String>,
    expansion: Expansion<K>,
    rules: SelectRules,
    check_mode: CheckMode,
    tree_checkable: bool,
    multi: bool,
    max_count: Option<usize>,
    max_tag_count: Option<usize>,
    strategy: ShowCheckedStrategy,
    focused: Option<K>,
    on_change: Option<ChangeHandler<K, T>>,
    on_search: Option<SearchHandler>,
    on_tree_expand: Option<ExpandHandler<K>>,
}

impl<K: fmt::Debug, T: fmt::Debug, M: fmt::Debug> fmt::Debug for TreeSelect<K, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSelect")
            .field("index", &self.index)
            .field("matcher", &self.matcher)
            .field("value", &self.value)
            .field("search", &self.search)
            .field("expansion", &self.expansion)
            .field("rules", &self.rules)
            .field("check_mode", &self.check_mode)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl<K, T> TreeSelect<K, T, TitleContains>
where
    K: Clone + Eq + Hash + 'static,
    T: Clone + fmt::Display + 'static,
{
    /// Index `forest` and resolve state from `config`, matching titles by substring.
    pub fn new(forest: Forest<K, T>, config: TreeSelectConfig<K>) -> Result<Self, IndexError<K>> {
        Self::with_matcher(forest, config, TitleContains)
    }
}

impl<K, T, M> TreeSelect<K, T, M>
where
    K: Clone + Eq + Hash + 'static,
    T: Clone + 'static,
    M: Matcher<K, T>,
{
    /// Index `forest` and resolve state from `config`, filtering with `matcher`.
    pub fn with_matcher(
        forest: Forest<K, T>,
        config: TreeSelectConfig<K>,
        matcher: M,
    ) -> Result<Self, IndexError<K>> {
        let index = TreeIndex::build(forest)?;
        let multi = config.is_multi_valued();

        let seed = ExpansionSeed {
            keys: &config.tree_default_expanded_keys,
            expand_all: config.tree_default_expand_all,
            auto_expand_parent: false,
        };
        let expansion = Expansion::resolve(config.tree_expanded_keys, || seed.resolve(&index));

        let mode = if multi {
            SelectionMode::Multiple
        } else {
            SelectionMode::Single
        };
        let rules = SelectRules::new(mode)
            .with_deselect(false)
            .with_max_count(config.max_count);
        let value = Controlled::resolve(config.value, || {
            let keys = config.default_value.iter().cloned();
            if multi {
                keys.collect()
            } else {
                keys.take(1).collect()
            }
        });
        let check_mode = if config.tree_check_strictly {
            CheckMode::Strict
        } else {
            CheckMode::Conducted
        };

        let mut select = Self {
            cache: FilterCache::new(index.forest().clone()),
            index,
            view: None,
            matcher,
            value,
            search: Controlled::resolve(config.search, String::new),
            expansion,
            rules,
            check_mode,
            tree_checkable: config.tree_checkable,
            multi,
            max_count: config.max_count,
            max_tag_count: config.max_tag_count,
            strategy: config.show_checked_strategy,
            focused: None,
            on_change: None,
            on_search: None,
            on_tree_expand: None,
        };
        select.refresh_view();
        Ok(select)
    }

    /// Replace the forest, rebuilding indices only if its identity changed.
    pub fn set_forest(&mut self, forest: Forest<K, T>) -> Result<(), IndexError<K>> {
        if self.index.is_current(&forest) {
            return Ok(());
        }
        self.index = TreeIndex::build(forest)?;
        self.refresh_view();
        if self
            .focused
            .as_ref()
            .is_some_and(|key| !self.view().contains(key))
        {
            self.focused = None;
        }
        Ok(())
    }

    fn refresh_view(&mut self) {
        let projected = self
            .cache
            .get(self.index.forest(), self.search.get(), &self.matcher)
            .clone();
        if self.index.is_current(&projected) {
            self.view = None;
        } else if !self.view.as_ref().is_some_and(|v| v.is_current(&projected)) {
            // A projection of a valid forest cannot hold duplicate keys.
            self.view = TreeIndex::build(projected).ok();
        }
    }

    /// The index of the full forest.
    pub fn index(&self) -> &TreeIndex<K, T> {
        &self.index
    }

    fn view(&self) -> &TreeIndex<K, T> {
        self.view.as_ref().unwrap_or(&self.index)
    }

    /// Called whenever the value changes.
    pub fn on_change(&mut self, handler: impl FnMut(&ChangeEvent<'_, K, T>) + 'static) {
        self.on_change = Some(Box::new(handler));
    }

    /// Called whenever the search query is edited.
    pub fn on_search(&mut self, handler: impl FnMut(&str) + 'static) {
        self.on_search = Some(Box::new(handler));
    }

    /// Called with the proposed expanded set whenever a node is expanded or collapsed.
    pub fn on_tree_expand(&mut self, handler: impl FnMut(&KeySet<K>) + 'static) {
        self.on_tree_expand = Some(Box::new(handler));
    }

    // --- intents ---

    /// Pick `key`; returns the proposed value.
    ///
    /// In a checkable select, picking a row is a [`check`](Self::check).
    /// Single mode replaces the value (re-picking keeps it) and clears an
    /// engine-owned search query.
    pub fn select(&mut self, key: &K) -> Option<KeySet<K>> {
        if self.tree_checkable {
            return self.check(key);
        }
        let next = self.rules.propose(&self.index, self.value.get(), key)?.keys;
        let keys = self.commit(next, Some(key));
        if !self.multi && self.search.propose(String::new()) {
            self.refresh_view();
        }
        Some(keys)
    }

    /// Checkbox click on `key`; returns the proposed value.
    pub fn check(&mut self, key: &K) -> Option<KeySet<K>> {
        if !self.tree_checkable {
            log::debug!("check intent ignored: select is not checkable");
            return None;
        }
        let checked = !self.value.get().contains(key);
        let next =
            propose_checked(&self.index, self.value.get(), key, checked, self.check_mode)?.keys;
        if checked && self.max_count.is_some_and(|max| next.len() > max) {
            log::debug!("check intent ignored: max count exceeded");
            return None;
        }
        Some(self.commit(next, Some(key)))
    }

    /// Empty the value.
    pub fn clear(&mut self) -> KeySet<K> {
        self.commit(KeySet::new(), None)
    }

    /// Remove one key from the value, leaving the rest untouched.
    pub fn remove_tag(&mut self, key: &K) -> Option<KeySet<K>> {
        if !self.value.get().contains(key) {
            return None;
        }
        let next = self.value.get().without(key);
        Some(self.commit(next, None))
    }

    /// Propose `keys` as the value and report it.
    fn commit(&mut self, keys: KeySet<K>, trigger: Option<&K>) -> KeySet<K> {
        if self.value.propose(keys.clone()) {
            log::trace!("value committed ({} keys)", keys.len());
        }
        if let Some(handler) = self.on_change.as_mut() {
            let event = ChangeEvent {
                value: SelectValue::from_keys(&keys, self.multi),
                labels: keys
                    .iter()
                    .map(|k| self.index.find(k).map(|node| &node.title))
                    .collect(),
                trigger: trigger.and_then(|k| self.index.find(k)),
                keys: keys.clone(),
            };
            handler(&event);
        }
        keys
    }

    /// Edit the search query.
    pub fn set_search(&mut self, query: &str) {
        self.search.propose(String::from(query));
        if let Some(handler) = self.on_search.as_mut() {
            handler(query);
        }
        self.refresh_view();
    }

    /// Flip the expansion of `key`; returns the proposed expanded set.
    pub fn toggle_expand(&mut self, key: &K) -> Option<KeySet<K>> {
        let expanded = !self.expansion.is_expanded(key);
        self.set_expanded(key, expanded)
    }

    fn set_expanded(&mut self, key: &K, expanded: bool) -> Option<KeySet<K>> {
        let keys = self.expansion.set_expanded(&self.index, key, expanded)?.keys;
        if let Some(handler) = self.on_tree_expand.as_mut() {
            handler(&keys);
        }
        Some(keys)
    }

    /// Move keyboard focus to `key` if it is shown in the dropdown.
    pub fn focus(&mut self, key: &K) -> bool {
        if !self.view().contains(key) {
            return false;
        }
        self.focused = Some(key.clone());
        true
    }

    /// Apply a keyboard intent within the dropdown; returns the focused key afterwards.
    ///
    /// Up and Down wrap around. Activate checks when checkable, otherwise selects.
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
                    self.select(&key);
                }
                return self.focused.as_ref();
            }
        };
        let rows = visible_rows(self.view(), self.expansion.keys());
        let next = navigate(&rows, self.focused.as_ref(), direction, WrapMode::Wrap).cloned();
        if next.is_some() {
            self.focused = next;
        }
        self.focused.as_ref()
    }

    /// Feed back the host-owned value.
    pub fn sync_value(&mut self, keys: KeySet<K>) {
        self.value.sync(keys);
    }

    /// Feed back the host-owned search query.
    pub fn sync_search(&mut self, query: impl Into<String>) {
        self.search.sync(query.into());
        self.refresh_view();
    }

    /// Feed back the host-owned expanded set.
    pub fn sync_expanded(&mut self, keys: KeySet<K>) {
        self.expansion.sync(keys);
    }

    // --- queries ---

    /// The value, shaped by the select's mode.
    pub fn value(&self) -> SelectValue<K> {
        SelectValue::from_keys(self.value.get(), self.multi)
    }

    /// The value as a key set.
    pub fn keys(&self) -> &KeySet<K> {
        self.value.get()
    }

    /// Titles of the value's keys, in value order.
    pub fn labels(&self) -> Vec<Option<&T>> {
        self.value
            .get()
            .iter()
            .map(|k| self.index.find(k).map(|node| &node.title))
            .collect()
    }

    /// The current search query.
    pub fn search(&self) -> &str {
        self.search.get()
    }

    /// The forest shown in the dropdown for the current query.
    pub fn filtered_forest(&self) -> &Forest<K, T> {
        self.view().forest()
    }

    /// Rows of the dropdown, in order.
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_, K, T>> {
        visible_rows(self.view(), self.expansion.keys())
    }

    /// Whether `key` is expanded in the dropdown.
    pub fn is_expanded(&self, key: &K) -> bool {
        self.expansion.is_expanded(key)
    }

    /// The expanded set.
    pub fn expanded_keys(&self) -> &KeySet<K> {
        self.expansion.keys()
    }

    /// Derived checkbox state of `key`.
    pub fn state_of(&self, key: &K) -> CheckState {
        check_state(&self.index, self.value.get(), key, self.check_mode)
    }

    /// The key holding keyboard focus.
    pub fn focused(&self) -> Option<&K> {
        self.focused.as_ref()
    }

    /// Tags to render, after the show-checked strategy and tag limit.
    ///
    /// The strategy and limit apply only to multi-valued selects.
    pub fn display_tags(&self) -> DisplayTags<'_, K> {
        let value = self.value.get();
        if !self.multi {
            return DisplayTags {
                keys: value.iter().collect(),
                hidden: 0,
            };
        }
        let mut keys: Vec<&K> = match self.strategy {
            ShowCheckedStrategy::All => value.iter().collect(),
            ShowCheckedStrategy::Parent => value
                .iter()
                .filter(|k| !self.index.ancestors_of(k).any(|a| value.contains(a)))
                .collect(),
            ShowCheckedStrategy::Child => value
                .iter()
                .filter(|k| self.index.find(k).is_none_or(|node| !node.has_children()))
                .collect(),
        };
        let hidden = match self.max_tag_count {
            Some(max) if keys.len() > max => {
                let hidden = keys.len() - max;
                keys.truncate(max);
                hidden
            }
            _ => 0,
        };
        DisplayTags { keys, hidden }
    }
}
