//! Ancestry traversal for cycle prevention.

use std::sync::Arc;

use uuid::Uuid;

use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::NodeStore;

use super::MAX_TREE_DEPTH;

/// Walks parent pointers to answer containment questions.
///
/// Used by the move operation to refuse placing a folder inside its own
/// subtree. Read-only; cost is bounded by tree depth.
#[derive(Debug, Clone)]
pub struct AncestryChecker {
    /// Node metadata store.
    store: Arc<dyn NodeStore>,
}

impl AncestryChecker {
    /// Creates a new checker over the given store.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Returns whether `candidate_id` lies inside the subtree rooted at
    /// `ancestor_id`, walking parent pointers from the candidate upward.
    ///
    /// The candidate itself does not count as its own descendant.
    pub async fn is_descendant(
        &self,
        candidate_id: Uuid,
        ancestor_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<bool> {
        let mut current = self.store.find_by_id(candidate_id, owner_id).await?;
        let mut depth = 0usize;

        while let Some(node) = current {
            let Some(parent_id) = node.parent_id else {
                return Ok(false);
            };
            if parent_id == ancestor_id {
                return Ok(true);
            }

            depth += 1;
            if depth > MAX_TREE_DEPTH {
                return Err(AppError::broken_chain(format!(
                    "Ancestor chain of node {candidate_id} exceeds maximum depth"
                )));
            }
            current = self.store.find_by_id(parent_id, owner_id).await?;
        }

        Ok(false)
    }
}
