//! PostgreSQL node store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use stratus_core::error::{AppError, ErrorKind};
use stratus_core::result::AppResult;
use stratus_core::traits::NodeStore;
use stratus_entity::node::{CreateNode, Node};

/// [`NodeStore`] backed by the `nodes` table.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Create a new node store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    async fn find_by_parent_and_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM nodes \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find node by name", e)
        })
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM nodes \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY is_folder DESC, updated_at DESC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn list_all(&self, owner_id: Uuid) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM nodes WHERE owner_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list nodes", e))
    }

    async fn insert(&self, node: &CreateNode) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "INSERT INTO nodes \
             (owner_id, parent_id, name, is_folder, path, storage_path, mime_type, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(node.owner_id)
        .bind(node.parent_id)
        .bind(&node.name)
        .bind(node.is_folder)
        .bind(&node.path)
        .bind(&node.storage_path)
        .bind(&node.mime_type)
        .bind(node.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("nodes_owner_parent_name_key") =>
            {
                AppError::name_collision(format!(
                    "A node named '{}' already exists here",
                    node.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert node", e),
        })
    }

    async fn update(&self, node: &Node) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE nodes SET parent_id = $3, name = $4, path = $5, storage_path = $6, \
             mime_type = $7, size_bytes = $8, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(node.id)
        .bind(node.owner_id)
        .bind(node.parent_id)
        .bind(&node.name)
        .bind(&node.path)
        .bind(&node.storage_path)
        .bind(&node.mime_type)
        .bind(node.size_bytes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("nodes_owner_parent_name_key") =>
            {
                AppError::name_collision(format!(
                    "A node named '{}' already exists here",
                    node.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update node", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Node {} not found", node.id)))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete node", e))?;
        Ok(result.rows_affected() > 0)
    }
}
