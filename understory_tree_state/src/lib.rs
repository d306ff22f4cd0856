// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tree State: expansion, selection, and tri-state check state for hierarchical views.
//!
//! This crate is the state engine behind tree browsers and tree-based select controls.
//! It tracks which nodes of a forest are expanded, selected, and checked, and keeps
//! checkbox state consistent between parents and descendants. It knows nothing about
//! painting; hosts dispatch intents and render from the resulting snapshots.
//!
//! - [`TreeIndex`] flattens a [`Forest`] into a pre-order arena with O(1) parent lookup
//!   and contiguous descendant ranges. It is rebuilt only when the forest identity changes.
//! - [`KeySet`] is the copy-on-write representation of every state set. Each committed
//!   transition yields a fresh set, so [`KeySet::ptr_eq`] is enough for change detection.
//! - [`Expansion`], [`Selection`], and [`Checks`] are the controllers. Each one computes a
//!   proposed next set for an intent and commits it only when the engine owns the set
//!   ([`Authority::Internal`]). Host-owned sets are fed back with `sync`.
//! - [`filter`] projects a forest onto the nodes matching a query, keeping their ancestors.
//! - [`visible_rows`] and [`navigate`] flatten the expanded forest into rows and move a
//!   focus cursor over them.
//! - [`TreeState`] composes all of the above behind the intent surface of a tree browser.
//!
//! ## Check propagation
//!
//! In [`CheckMode::Conducted`], checking a node checks its whole subtree, and each ancestor
//! becomes checked exactly when all of its children are. [`CheckState::Indeterminate`] is
//! derived on read and never stored. [`CheckMode::Strict`] decouples every checkbox.
//!
//! ```rust
//! use understory_tree_state::{CheckMode, CheckState, Checks, Forest, KeySet, TreeIndex, TreeNode};
//!
//! let forest = Forest::new(vec![TreeNode::new("a", "A").with_children([
//!     TreeNode::new("b", "B"),
//!     TreeNode::new("c", "C"),
//! ])]);
//! let index = TreeIndex::build(forest).unwrap();
//! let mut checks = Checks::new(CheckMode::Conducted, KeySet::new());
//!
//! checks.set_checked(&index, &"b", true);
//! assert_eq!(checks.state_of(&index, &"a"), CheckState::Indeterminate);
//!
//! checks.set_checked(&index, &"c", true);
//! assert_eq!(checks.state_of(&index, &"a"), CheckState::Checked);
//! assert_eq!(checks.keys().len(), 3);
//! ```
//!
//! ## Ignored intents
//!
//! Intents naming a key that is no longer in the forest, or a node whose flags forbid the
//! intent, are ignored: the controller returns `None`, nothing is emitted, and a `debug`
//! record is logged through the [`log`] facade. Steady-state operations never fail; only
//! indexing a forest with duplicate keys returns an [`IndexError`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod authority;
mod check;
mod expansion;
mod filter;
mod index;
mod keys;
mod selection;
mod tree;
mod types;
mod visible;

pub use authority::{Authority, Controlled};
pub use check::{CheckEvent, CheckMode, Checks, check_state, conduct_keys, propose_checked};
pub use expansion::{ExpandEvent, Expansion, ExpansionSeed, propose_expanded};
pub use filter::{FilterCache, Matcher, TitleContains, filter};
pub use index::{IndexError, TreeIndex};
pub use keys::{KeySet, KeySetEdit};
pub use selection::{SelectEvent, SelectRules, Selection, SelectionMode};
pub use tree::{TreeConfig, TreeKey, TreeState};
pub use types::{CheckState, Forest, NodeFlags, TreeNode};
pub use visible::{Navigation, VisibleRow, WrapMode, navigate, visible_rows};
