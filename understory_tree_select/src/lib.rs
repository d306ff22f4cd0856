// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tree Select: headless state for tree-backed select controls.
//!
//! A tree select is a combo box whose dropdown is a tree. This crate layers the
//! select-specific behavior over [`understory_tree_state`]:
//!
//! - One value set backs both plain selection and checkboxes. The value is
//!   materialized as a [`SelectValue`]: a single optional key, or an ordered list.
//! - A search query projects the forest through a [`Matcher`], keeping ancestors of
//!   matches. The projection is memoized on forest identity and query.
//! - [`TreeSelect::display_tags`] applies the [`ShowCheckedStrategy`] and the tag
//!   limit to decide which values render as tags.
//! - Value, search query, and expanded set may each be owned by the host. Intents
//!   against a host-owned set only report the proposed next state.
//!
//! ```rust
//! use understory_tree_select::{SelectValue, TreeSelect, TreeSelectConfig};
//! use understory_tree_state::{Forest, TreeNode};
//!
//! let forest = Forest::new(vec![TreeNode::new("fruit", "Fruit").with_children([
//!     TreeNode::new("apple", "Apple"),
//!     TreeNode::new("pear", "Pear"),
//! ])]);
//! let config = TreeSelectConfig::default().with_tree_checkable(true);
//! let mut select = TreeSelect::new(forest, config).unwrap();
//!
//! select.check(&"apple");
//! select.check(&"pear");
//! assert_eq!(
//!     select.value(),
//!     SelectValue::Multiple(vec!["apple", "pear", "fruit"])
//! );
//!
//! select.set_search("pe");
//! assert_eq!(select.filtered_forest().roots()[0].children.len(), 1);
//! ```
//!
//! [`Matcher`]: understory_tree_state::Matcher
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod select;
mod value;

pub use config::{ShowCheckedStrategy, TreeSelectConfig};
pub use select::TreeSelect;
pub use value::{ChangeEvent, DisplayTags, SelectValue};
