//! Application state: saved trees and the current selection.
//!
//! State only changes through [`AppState::apply`], one [`Transition`] per user
//! action or store completion.

use tracing::debug;

use crate::domain::{SavedTree, TreeId, TreeNode};

/// How many of the newest trees are offered for direct selection.
pub const RECENT_COUNT: usize = 2;

/// Named state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The store returned the full list (empty after a failed fetch).
    TreesLoaded(Vec<SavedTree>),
    /// The store accepted a new tree; it is appended and selected.
    TreeSaved(SavedTree),
    /// The user picked a tree by id, or cleared the selection.
    TreeSelected(Option<TreeId>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    trees: Vec<SavedTree>,
    selected: Option<TreeId>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::TreesLoaded(trees) => {
                debug!(count = trees.len(), "trees loaded");
                self.trees = trees;
                if let Some(id) = self.selected {
                    if self.find(id).is_none() {
                        self.selected = None;
                    }
                }
            }
            Transition::TreeSaved(tree) => {
                debug!(id = tree.id, "tree saved");
                self.selected = Some(tree.id);
                self.trees.push(tree);
            }
            Transition::TreeSelected(id) => {
                // unknown ids clear the selection
                self.selected = id.filter(|id| self.find(*id).is_some());
                debug!(selected = ?self.selected, "tree selected");
            }
        }
    }

    pub fn trees(&self) -> &[SavedTree] {
        &self.trees
    }

    pub fn find(&self, id: TreeId) -> Option<&SavedTree> {
        self.trees.iter().find(|t| t.id == id)
    }

    /// The newest trees, oldest of them first.
    pub fn recent_trees(&self) -> &[SavedTree] {
        let start = self.trees.len().saturating_sub(RECENT_COUNT);
        &self.trees[start..]
    }

    /// Everything but the recent trees.
    pub fn older_trees(&self) -> &[SavedTree] {
        let end = self.trees.len().saturating_sub(RECENT_COUNT);
        &self.trees[..end]
    }

    pub fn selected_id(&self) -> Option<TreeId> {
        self.selected
    }

    pub fn selected_tree(&self) -> Option<&SavedTree> {
        self.selected.and_then(|id| self.find(id))
    }

    /// Root of the tree to draw, if any.
    pub fn displayed_tree(&self) -> Option<&TreeNode> {
        self.selected_tree()?.tree_structure.as_ref()
    }
}
