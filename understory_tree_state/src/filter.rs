// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter projection: prune a forest to the nodes matching a query.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Display;

use crate::types::{Forest, TreeNode};

/// Decides whether a node matches a search query.
///
/// Any `Fn(&TreeNode<K, T>, &str) -> bool` is a matcher.
pub trait Matcher<K, T> {
    /// Whether `node` matches `query`. Never called with an empty query.
    fn matches(&self, node: &TreeNode<K, T>, query: &str) -> bool;
}

impl<K, T, F> Matcher<K, T> for F
where
    F: Fn(&TreeNode<K, T>, &str) -> bool,
{
    fn matches(&self, node: &TreeNode<K, T>, query: &str) -> bool {
        self(node, query)
    }
}

/// Case-insensitive substring match over the title's `Display` text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TitleContains;

impl<K, T: Display> Matcher<K, T> for TitleContains {
    fn matches(&self, node: &TreeNode<K, T>, query: &str) -> bool {
        let title = format!("{}", node.title).to_lowercase();
        title.contains(&query.to_lowercase())
    }
}

/// Project `forest` onto the nodes matching `query`.
///
/// A node survives if it matches or any descendant survives; survivors keep
/// only their surviving children. The source forest is untouched. An empty
/// query returns `forest` itself, preserving its identity.
///
/// ```rust
/// use understory_tree_state::{filter, Forest, TitleContains, TreeNode};
///
/// let forest = Forest::new(vec![
///     TreeNode::new(1, "Fruits").with_children([
///         TreeNode::new(2, "Apple"),
///         TreeNode::new(3, "Banana"),
///     ]),
///     TreeNode::new(4, "Veggies").with_children([TreeNode::new(5, "Carrot")]),
/// ]);
/// let found = filter(&forest, "an", &TitleContains);
/// assert_eq!(found.roots().len(), 1);
/// assert_eq!(found.roots()[0].children[0].title, "Banana");
/// ```
pub fn filter<K, T, M>(forest: &Forest<K, T>, query: &str, matcher: &M) -> Forest<K, T>
where
    K: Clone,
    T: Clone,
    M: Matcher<K, T> + ?Sized,
{
    if query.is_empty() {
        return forest.clone();
    }
    let projected: Forest<K, T> = forest
        .roots()
        .iter()
        .filter_map(|node| project(node, query, matcher))
        .collect();
    log::trace!("filter kept {} roots", projected.roots().len());
    projected
}

fn project<K, T, M>(node: &TreeNode<K, T>, query: &str, matcher: &M) -> Option<TreeNode<K, T>>
where
    K: Clone,
    T: Clone,
    M: Matcher<K, T> + ?Sized,
{
    let children: Vec<_> = node
        .children
        .iter()
        .filter_map(|child| project(child, query, matcher))
        .collect();
    if children.is_empty() && !matcher.matches(node, query) {
        return None;
    }
    Some(TreeNode {
        key: node.key.clone(),
        title: node.title.clone(),
        children,
        flags: node.flags,
        is_leaf: node.is_leaf,
    })
}

/// Memoized [`filter`] result, recomputed only when the source forest
/// identity or the query changes.
#[derive(Clone, Debug)]
pub struct FilterCache<K, T> {
    source: Forest<K, T>,
    query: String,
    result: Forest<K, T>,
}

impl<K, T> FilterCache<K, T>
where
    K: Clone,
    T: Clone,
{
    /// A cache holding the unfiltered `forest`.
    pub fn new(forest: Forest<K, T>) -> Self {
        Self {
            source: forest.clone(),
            query: String::new(),
            result: forest,
        }
    }

    /// The projection of `forest` for `query`.
    pub fn get<M>(&mut self, forest: &Forest<K, T>, query: &str, matcher: &M) -> &Forest<K, T>
    where
        M: Matcher<K, T> + ?Sized,
    {
        if !Forest::ptr_eq(&self.source, forest) || self.query != query {
            self.result = filter(forest, query, matcher);
            self.source = forest.clone();
            self.query.clear();
            self.query.push_str(query);
        }
        &self.result
    }
}
