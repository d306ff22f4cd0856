// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible rows of an expanded forest, and focus movement over them.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::index::TreeIndex;
use crate::keys::KeySet;
use crate::types::TreeNode;

/// A row the host should render.
#[derive(Clone, Debug)]
pub struct VisibleRow<'a, K, T> {
    /// The node shown on this row.
    pub node: &'a TreeNode<K, T>,
    /// The node's key.
    pub key: &'a K,
    /// Nesting depth (roots are at depth 0).
    pub depth: usize,
    /// The parent's key, if any. A visible row's parent is always visible.
    pub parent: Option<&'a K>,
    /// Whether the node is in the expanded set.
    pub expanded: bool,
}

/// Flatten `index` into pre-order rows, descending only into expanded nodes.
pub fn visible_rows<'a, K, T>(
    index: &'a TreeIndex<K, T>,
    expanded: &KeySet<K>,
) -> Vec<VisibleRow<'a, K, T>>
where
    K: Clone + Eq + Hash,
{
    let mut rows = Vec::new();
    let mut slot = 0;
    while slot < index.len() {
        let entry = index.entry(slot);
        let open = expanded.contains(&entry.key);
        rows.push(VisibleRow {
            node: index.node_at(slot),
            key: &entry.key,
            depth: entry.depth,
            parent: entry.parent.map(|p| &index.entry(p).key),
            expanded: open,
        });
        slot = if open { slot + 1 } else { entry.end };
    }
    rows
}

/// Focus movement intents over visible rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// The row below.
    Next,
    /// The row above.
    Prev,
    /// The first row.
    First,
    /// The last row.
    Last,
    /// The row of the origin's parent.
    Parent,
    /// The first child row of an expanded origin.
    FirstChild,
}

/// Whether `Next`/`Prev` wrap at the ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Stop at the first and last rows.
    #[default]
    Never,
    /// Continue from the opposite end.
    Wrap,
}

/// The key focus moves to from `origin`, or `None` if it does not move.
///
/// An absent (or no longer visible) origin makes `Next` land on the first row
/// and `Prev` on the last.
pub fn navigate<'a, K, T>(
    rows: &[VisibleRow<'a, K, T>],
    origin: Option<&K>,
    direction: Navigation,
    wrap: WrapMode,
) -> Option<&'a K>
where
    K: Eq,
{
    let first = rows.first().map(|row| row.key);
    let last = rows.last().map(|row| row.key);
    let pos = origin.and_then(|key| rows.iter().position(|row| row.key == key));
    match direction {
        Navigation::First => first,
        Navigation::Last => last,
        Navigation::Next => match pos {
            Some(pos) if pos + 1 < rows.len() => Some(rows[pos + 1].key),
            Some(_) if wrap == WrapMode::Wrap => first,
            Some(_) => None,
            None => first,
        },
        Navigation::Prev => match pos {
            Some(pos) if pos > 0 => Some(rows[pos - 1].key),
            Some(_) if wrap == WrapMode::Wrap => last,
            Some(_) => None,
            None => last,
        },
        Navigation::Parent => rows[pos?].parent,
        Navigation::FirstChild => {
            let pos = pos?;
            let child = rows.get(pos + 1)?;
            (rows[pos].expanded && child.parent == Some(rows[pos].key)).then_some(child.key)
        }
    }
}
