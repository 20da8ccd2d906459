//! Saved-tree controller
//!
//! Owns the [`AppState`] and turns user actions and store results into
//! transitions. Store failures never escape: a failed list leaves an empty
//! list, a failed save leaves the state untouched.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::application::state::{AppState, Transition};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{parse_numbers, SavedTree, TreeBuilder, TreeId, TreeNode};
use crate::infrastructure::traits::TreeStore;

/// Result of the generate action.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// Input was blank; nothing was built.
    Empty,
    /// The tree was saved and is now selected.
    Saved(SavedTree),
    /// The tree was built but the store refused it; state unchanged.
    SaveFailed { tree: TreeNode, message: String },
}

pub struct TreeService {
    store: Arc<dyn TreeStore>,
    state: AppState,
}

impl TreeService {
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self {
            store,
            state: AppState::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Fetch the saved trees. Falls back to an empty list on failure.
    #[instrument(skip(self))]
    pub fn load(&mut self) -> &AppState {
        let trees = match self.store.list_trees() {
            Ok(trees) => {
                info!("fetched {} trees", trees.len());
                trees
            }
            Err(e) => {
                warn!("cannot fetch trees, showing none: {e}");
                Vec::new()
            }
        };
        self.state.apply(Transition::TreesLoaded(trees));
        &self.state
    }

    /// Parse `input`, build the tree and save it.
    ///
    /// Blank input is a no-op. Invalid numbers reject the whole input.
    #[instrument(skip(self))]
    pub fn generate(&mut self, input: &str) -> ApplicationResult<GenerateOutcome> {
        if input.trim().is_empty() {
            return Ok(GenerateOutcome::Empty);
        }
        let numbers = parse_numbers(input)?;
        let Some(tree) = TreeBuilder::build(&numbers) else {
            return Ok(GenerateOutcome::Empty);
        };
        debug!(nodes = tree.len(), "generated tree");

        match self.store.save_tree(input, Some(&tree)) {
            Ok(saved) => {
                info!(id = saved.id, "saved tree");
                self.state.apply(Transition::TreeSaved(saved.clone()));
                Ok(GenerateOutcome::Saved(saved))
            }
            Err(e) => {
                error!("error saving tree: {e}");
                Ok(GenerateOutcome::SaveFailed {
                    tree,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Select a tree by id.
    pub fn select(&mut self, id: TreeId) -> ApplicationResult<&SavedTree> {
        self.state.apply(Transition::TreeSelected(Some(id)));
        self.state
            .selected_tree()
            .ok_or(ApplicationError::TreeNotFound(id))
    }

    pub fn clear_selection(&mut self) {
        self.state.apply(Transition::TreeSelected(None));
    }
}
