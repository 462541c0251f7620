//! Node metadata store trait.

use async_trait::async_trait;
use uuid::Uuid;

use stratus_entity::node::{CreateNode, Node};

use crate::result::AppResult;

/// Persistence contract for node metadata.
///
/// Every query is scoped by `owner_id` — a node is never visible outside
/// its owner's tree. Implementations must enforce the sibling-uniqueness
/// invariant `(owner_id, parent_id, name)` and surface violations as a
/// name-collision error. The trait is defined here in `stratus-core` and
/// implemented in `stratus-database` (PostgreSQL and in-memory).
#[async_trait]
pub trait NodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a node by ID, scoped to its owner.
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Node>>;

    /// Find a node by its parent and name (the sibling-uniqueness key).
    async fn find_by_parent_and_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Node>>;

    /// List the direct children of a folder (or the root level when
    /// `parent_id` is None), folders first, most recently updated first.
    async fn list_children(&self, owner_id: Uuid, parent_id: Option<Uuid>)
    -> AppResult<Vec<Node>>;

    /// List every node owned by a user, most recently updated first.
    async fn list_all(&self, owner_id: Uuid) -> AppResult<Vec<Node>>;

    /// Insert a new node and return the persisted row.
    async fn insert(&self, node: &CreateNode) -> AppResult<Node>;

    /// Update an existing node and return the persisted row.
    async fn update(&self, node: &Node) -> AppResult<Node>;

    /// Delete a node by ID. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool>;
}
