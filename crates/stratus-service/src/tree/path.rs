//! Logical and physical path resolution.

use std::sync::Arc;

use uuid::Uuid;

use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::NodeStore;
use stratus_entity::node::Node;

use super::MAX_TREE_DEPTH;

/// Computes a node's logical path (slash-delimited ancestor chain) and
/// physical path (owner prefix + ancestor chain) from its parent
/// pointers.
///
/// Resolution never touches the filesystem; it only reads the store.
/// Callers cache the results on the node row after any structural
/// mutation, so the walking methods are the recompute mechanism and the
/// cached `path`/`storage_path` fields are what everything else reads.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Node metadata store.
    store: Arc<dyn NodeStore>,
}

impl PathResolver {
    /// Creates a new resolver over the given store.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Collect the names from the root down to `node`, inclusive.
    ///
    /// Fails with a broken-chain error if an ancestor id does not resolve —
    /// that cannot happen while the tree invariants hold, so it is a bug
    /// signal rather than a user-facing condition.
    async fn ancestor_names(&self, node: &Node) -> AppResult<Vec<String>> {
        let mut names = vec![node.name.clone()];
        let mut current = node.parent_id;

        while let Some(parent_id) = current {
            if names.len() > MAX_TREE_DEPTH {
                return Err(AppError::broken_chain(format!(
                    "Ancestor chain of node {} exceeds maximum depth",
                    node.id
                )));
            }
            let parent = self
                .store
                .find_by_id(parent_id, node.owner_id)
                .await?
                .ok_or_else(|| {
                    AppError::broken_chain(format!(
                        "Ancestor {parent_id} of node {} does not resolve",
                        node.id
                    ))
                })?;
            names.push(parent.name.clone());
            current = parent.parent_id;
        }

        names.reverse();
        Ok(names)
    }

    /// Resolve the logical path of a node (e.g. `/docs/report.txt`).
    pub async fn logical_path(&self, node: &Node) -> AppResult<String> {
        let names = self.ancestor_names(node).await?;
        Ok(format!("/{}", names.join("/")))
    }

    /// Resolve the physical path of a node, relative to the storage root
    /// (e.g. `{owner_id}/docs/report.txt`).
    pub async fn physical_path(&self, node: &Node) -> AppResult<String> {
        let names = self.ancestor_names(node).await?;
        Ok(format!("{}/{}", node.owner_id, names.join("/")))
    }

    /// Resolve both paths in a single ancestor walk.
    pub async fn resolve_paths(&self, node: &Node) -> AppResult<(String, String)> {
        let names = self.ancestor_names(node).await?;
        let joined = names.join("/");
        Ok((format!("/{joined}"), format!("{}/{joined}", node.owner_id)))
    }

    /// Compute the paths of a child named `name` under `parent` (or under
    /// the owner's root when `parent` is None), from the parent's cached
    /// paths. Pure; used when creating nodes and when rewriting a mutated
    /// subtree top-down.
    pub fn child_paths(owner_id: Uuid, parent: Option<&Node>, name: &str) -> (String, String) {
        match parent {
            Some(p) => (
                format!("{}/{name}", p.path),
                format!("{}/{name}", p.storage_path),
            ),
            None => (format!("/{name}"), format!("{owner_id}/{name}")),
        }
    }
}
