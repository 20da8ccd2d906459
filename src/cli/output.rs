//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::domain::{format_value, TreeNode};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Text rendering of a tree, children tagged `L:`/`R:`.
pub fn tree_text(root: &TreeNode) -> Tree<String> {
    fn build(node: &TreeNode, label: String) -> Tree<String> {
        let mut tree = Tree::new(label);
        if let Some(left) = &node.left {
            tree.push(build(left, format!("L: {}", format_value(left.value))));
        }
        if let Some(right) = &node.right {
            tree.push(build(right, format!("R: {}", format_value(right.value))));
        }
        tree
    }
    build(root, format_value(root.value))
}
