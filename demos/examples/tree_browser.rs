// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A checkable file browser driven from the keyboard.
//!
//! This example shows how a host uses `understory_tree_state`:
//! - build a `Forest` and hand it to a `TreeState`,
//! - subscribe to check events,
//! - move focus with arrow keys and toggle checkboxes with Activate,
//! - render from `visible_rows` and `state_of` after each intent.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_browser`

use std::cell::RefCell;
use std::rc::Rc;

use understory_tree_state::{CheckState, Forest, NodeFlags, TreeConfig, TreeKey, TreeNode, TreeState};

fn forest() -> Forest<&'static str, &'static str> {
    Forest::new(vec![
        TreeNode::new("src", "src").with_children([
            TreeNode::new("lib.rs", "lib.rs"),
            TreeNode::new("main.rs", "main.rs"),
            TreeNode::new("gen", "generated")
                .with_flags(NodeFlags::default() | NodeFlags::CHECKBOX_DISABLED),
        ]),
        TreeNode::new("docs", "docs").with_children([TreeNode::new("guide.md", "guide.md")]),
        TreeNode::new("Cargo.toml", "Cargo.toml"),
    ])
}

fn render(tree: &TreeState<&'static str, &'static str>) {
    for row in tree.visible_rows() {
        let cursor = if tree.focused() == Some(row.key) { '>' } else { ' ' };
        let toggle = match (row.node.is_leaf(), row.expanded) {
            (true, _) => ' ',
            (false, true) => 'v',
            (false, false) => '+',
        };
        let check = match tree.state_of(row.key) {
            CheckState::Checked => "[x]",
            CheckState::Indeterminate => "[-]",
            CheckState::Unchecked => "[ ]",
        };
        println!(
            "{cursor} {:indent$}{toggle} {check} {}",
            "",
            row.node.title,
            indent = row.depth * 2
        );
    }
    println!();
}

fn main() {
    let config = TreeConfig::default()
        .with_checkable(true)
        .with_default_expanded_keys(["src"]);
    let mut tree = TreeState::new(forest(), config).expect("keys are unique");

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    tree.on_check(move |event| {
        sink.borrow_mut().push(format!(
            "{} {} -> {} checked",
            if event.checked { "check" } else { "uncheck" },
            event.node.key,
            event.keys.len()
        ));
    });

    render(&tree);

    // Down into `lib.rs` and check it: `src` becomes indeterminate.
    tree.navigate(TreeKey::Down);
    tree.navigate(TreeKey::Down);
    tree.navigate(TreeKey::Activate);
    render(&tree);

    // Back to `src` and check the whole folder, the locked `gen` included.
    tree.navigate(TreeKey::Left);
    tree.navigate(TreeKey::Activate);
    render(&tree);

    // Collapse `src` and walk to `docs`, expanding it with Right.
    tree.navigate(TreeKey::Left);
    tree.navigate(TreeKey::Down);
    tree.navigate(TreeKey::Right);
    render(&tree);

    for line in log.borrow().iter() {
        println!("{line}");
    }
}
