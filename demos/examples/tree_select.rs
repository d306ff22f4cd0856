// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A checkable tree select with search and tags.
//!
//! This example shows how a host uses `understory_tree_select`:
//! - type a query and render the filtered dropdown,
//! - check nodes and render tags under the `Parent` strategy,
//! - own the value on the host side and feed accepted values back.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_select`

use std::cell::RefCell;
use std::rc::Rc;

use understory_tree_select::{ShowCheckedStrategy, TreeSelect, TreeSelectConfig};
use understory_tree_state::{Forest, KeySet, TreeNode};

fn forest() -> Forest<u32, &'static str> {
    Forest::new(vec![
        TreeNode::new(1, "Europe").with_children([
            TreeNode::new(11, "France"),
            TreeNode::new(12, "Finland"),
            TreeNode::new(13, "Spain"),
        ]),
        TreeNode::new(2, "Asia").with_children([
            TreeNode::new(21, "Japan"),
            TreeNode::new(22, "Nepal"),
        ]),
    ])
}

fn print_dropdown(select: &TreeSelect<u32, &'static str>) {
    println!("search {:?}", select.search());
    for row in select.visible_rows() {
        println!(
            "  {:indent$}{} {:?}",
            "",
            row.node.title,
            select.state_of(row.key),
            indent = row.depth * 2
        );
    }
}

fn print_tags(select: &TreeSelect<u32, &'static str>) {
    let tags = select.display_tags();
    let labels: Vec<&str> = tags
        .keys
        .iter()
        .filter_map(|key| select.index().find(key).map(|node| node.title))
        .collect();
    println!("tags {labels:?} (+{} more)", tags.hidden);
}

fn main() {
    // The host owns the value and accepts every proposal after logging it.
    let config = TreeSelectConfig::default()
        .with_tree_checkable(true)
        .with_tree_default_expand_all(true)
        .with_show_checked_strategy(ShowCheckedStrategy::Parent)
        .with_max_tag_count(2)
        .with_value(KeySet::new());
    let mut select = TreeSelect::new(forest(), config).expect("keys are unique");

    let pending = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&pending);
    select.on_change(move |event| {
        println!("change: {:?} labels {:?}", event.value, event.labels);
        *sink.borrow_mut() = Some(event.keys.clone());
    });

    select.set_search("f");
    print_dropdown(&select);

    for key in [11, 12, 13] {
        select.check(&key);
        if let Some(keys) = pending.borrow_mut().take() {
            select.sync_value(keys);
        }
    }
    select.set_search("");
    print_dropdown(&select);
    print_tags(&select);

    select.check(&22);
    if let Some(keys) = pending.borrow_mut().take() {
        select.sync_value(keys);
    }
    print_tags(&select);
}
