//! In-memory node store implementation.
//!
//! Enforces the same owner scoping and sibling-uniqueness invariants as
//! the PostgreSQL store. Used by the engine's integration tests and by
//! embedded deployments that run without a database server.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::NodeStore;
use stratus_entity::node::{CreateNode, Node};

/// [`NodeStore`] backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: RwLock<HashMap<Uuid, Node>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sibling_exists(
        nodes: &HashMap<Uuid, Node>,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        nodes.values().any(|n| {
            n.owner_id == owner_id
                && n.parent_id == parent_id
                && n.name == name
                && Some(n.id) != exclude
        })
    }

    fn sort_listing(mut nodes: Vec<Node>) -> Vec<Node> {
        nodes.sort_by(|a, b| {
            b.is_folder
                .cmp(&a.is_folder)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        nodes
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Node>> {
        let nodes = self.nodes.read().await;
        Ok(nodes.get(&id).filter(|n| n.owner_id == owner_id).cloned())
    }

    async fn find_by_parent_and_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Node>> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .values()
            .find(|n| n.owner_id == owner_id && n.parent_id == parent_id && n.name == name)
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        let children = nodes
            .values()
            .filter(|n| n.owner_id == owner_id && n.parent_id == parent_id)
            .cloned()
            .collect();
        Ok(Self::sort_listing(children))
    }

    async fn list_all(&self, owner_id: Uuid) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        let mut all: Vec<Node> = nodes
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }

    async fn insert(&self, node: &CreateNode) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        if Self::sibling_exists(&nodes, node.owner_id, node.parent_id, &node.name, None) {
            return Err(AppError::name_collision(format!(
                "A node named '{}' already exists here",
                node.name
            )));
        }

        let now = Utc::now();
        let row = Node {
            id: Uuid::new_v4(),
            owner_id: node.owner_id,
            parent_id: node.parent_id,
            name: node.name.clone(),
            is_folder: node.is_folder,
            path: node.path.clone(),
            storage_path: node.storage_path.clone(),
            mime_type: node.mime_type.clone(),
            size_bytes: node.size_bytes,
            created_at: now,
            updated_at: now,
        };
        nodes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, node: &Node) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        if !nodes
            .get(&node.id)
            .is_some_and(|n| n.owner_id == node.owner_id)
        {
            return Err(AppError::not_found(format!("Node {} not found", node.id)));
        }
        if Self::sibling_exists(
            &nodes,
            node.owner_id,
            node.parent_id,
            &node.name,
            Some(node.id),
        ) {
            return Err(AppError::name_collision(format!(
                "A node named '{}' already exists here",
                node.name
            )));
        }

        let mut row = node.clone();
        row.updated_at = Utc::now();
        nodes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let mut nodes = self.nodes.write().await;
        if nodes.get(&id).is_some_and(|n| n.owner_id == owner_id) {
            nodes.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_core::error::ErrorKind;

    fn create(owner: Uuid, parent: Option<Uuid>, name: &str, is_folder: bool) -> CreateNode {
        CreateNode {
            owner_id: owner,
            parent_id: parent,
            name: name.to_string(),
            is_folder,
            path: format!("/{name}"),
            storage_path: format!("{owner}/{name}"),
            mime_type: None,
            size_bytes: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();

        let node = store.insert(&create(owner, None, "docs", true)).await.unwrap();
        let found = store.find_by_id(node.id, owner).await.unwrap();
        assert_eq!(found.unwrap().name, "docs");

        let by_name = store
            .find_by_parent_and_name(owner, None, "docs")
            .await
            .unwrap();
        assert_eq!(by_name.unwrap().id, node.id);
    }

    #[tokio::test]
    async fn test_sibling_uniqueness() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();

        store.insert(&create(owner, None, "docs", true)).await.unwrap();
        let err = store
            .insert(&create(owner, None, "docs", false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameCollision);

        // Same name is fine under a different owner.
        store
            .insert(&create(Uuid::new_v4(), None, "docs", true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let node = store.insert(&create(owner, None, "secret", false)).await.unwrap();

        assert!(store.find_by_id(node.id, stranger).await.unwrap().is_none());
        assert!(!store.delete(node.id, stranger).await.unwrap());
        assert!(store.find_by_id(node.id, owner).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_listing_orders_folders_first() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();

        store.insert(&create(owner, None, "z.txt", false)).await.unwrap();
        store.insert(&create(owner, None, "a", true)).await.unwrap();

        let children = store.list_children(owner, None).await.unwrap();
        assert!(children[0].is_folder);
        assert_eq!(children[1].name, "z.txt");
    }
}
