//! Binary search tree construction from an ordered sequence of values.

use tracing::debug;

use crate::domain::entities::TreeNode;

/// Builds unbalanced binary search trees. Insertion order is input order.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Fold `numbers` into a tree; `None` for empty input.
    pub fn build(numbers: &[f64]) -> Option<TreeNode> {
        let root = numbers.iter().fold(None, |mut root, &value| {
            Self::insert(&mut root, value);
            root
        });
        debug!(count = numbers.len(), "built tree");
        root
    }

    /// Insert `value` as a leaf at the first empty slot.
    /// Smaller values go left, everything else (ties included) goes right.
    pub fn insert(root: &mut Option<TreeNode>, value: f64) {
        let Some(node) = root.as_mut() else {
            *root = Some(TreeNode::leaf(value));
            return;
        };
        let mut slot = Self::child_slot(node, value);
        while let Some(child) = slot {
            slot = Self::child_slot(child, value);
        }
        *slot = Some(Box::new(TreeNode::leaf(value)));
    }

    fn child_slot(node: &mut TreeNode, value: f64) -> &mut Option<Box<TreeNode>> {
        if value < node.value {
            &mut node.left
        } else {
            &mut node.right
        }
    }
}
