//! Tree mutation operations — upload, folder creation, rename, move,
//! recursive delete.
//!
//! Every structural operation mutates the filesystem first and commits
//! metadata second. The two stores cannot be changed atomically together;
//! this ordering bounds the failure window to orphaned physical bytes
//! with no corresponding row.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use stratus_core::config::storage::StorageConfig;
use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::{NodeStore, StorageProvider};
use stratus_entity::node::{CreateNode, Node};
use stratus_storage::providers::local::mime_from_path;

use crate::context::RequestContext;

use super::ancestry::AncestryChecker;
use super::path::PathResolver;

/// Parameters for a file upload.
///
/// The supplied name may contain path separators; the leading segments
/// denote folders to materialize under the target parent (a dragged
/// directory arrives this way).
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target parent folder ID (None for root level).
    pub parent_id: Option<Uuid>,
    /// Supplied file name, possibly with an implied sub-path.
    pub file_name: String,
    /// MIME type as reported by the client.
    pub mime_type: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

/// Keeps a user's node tree and the backing filesystem in step.
///
/// Structural operations on one owner's tree are serialized through a
/// per-owner async mutex; operations on different owners' trees proceed
/// concurrently and can never touch each other's rows or directories.
#[derive(Debug)]
pub struct TreeService {
    /// Node metadata store.
    store: Arc<dyn NodeStore>,
    /// Physical storage backend.
    storage: Arc<dyn StorageProvider>,
    /// Path resolver.
    resolver: PathResolver,
    /// Ancestry checker for move cycle prevention.
    ancestry: AncestryChecker,
    /// Storage configuration.
    config: StorageConfig,
    /// Per-owner structural mutation locks.
    owner_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        storage: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            resolver: PathResolver::new(Arc::clone(&store)),
            ancestry: AncestryChecker::new(Arc::clone(&store)),
            store,
            storage,
            config,
            owner_locks: DashMap::new(),
        }
    }

    /// The structural mutation lock for one owner's tree.
    fn owner_lock(&self, owner_id: Uuid) -> Arc<Mutex<()>> {
        self.owner_locks
            .entry(owner_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Uploads a file, materializing any folders implied by the supplied
    /// name, and returns the persisted node.
    ///
    /// An upload to an already-occupied path overwrites the existing
    /// file in place — same node id, new content and size.
    pub async fn upload(&self, ctx: &RequestContext, params: UploadParams) -> AppResult<Node> {
        if params.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let normalized = params.file_name.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let Some((&leaf, folder_segments)) = segments.split_last() else {
            return Err(AppError::validation("File name cannot be empty"));
        };
        for segment in &segments {
            validate_segment(segment)?;
        }

        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let start_parent = self.require_folder(ctx, params.parent_id).await?;
        let parent = self
            .materialize_chain(ctx, start_parent, folder_segments)
            .await?;
        let parent_id = parent.as_ref().map(|p| p.id);

        // Fetched before the write so a folder squatting on the name is
        // rejected without touching the filesystem.
        let existing = self
            .store
            .find_by_parent_and_name(ctx.user_id, parent_id, leaf)
            .await?;
        if existing.as_ref().is_some_and(|n| n.is_folder) {
            return Err(AppError::name_collision(format!(
                "A folder named '{leaf}' already exists here"
            )));
        }

        let (path, storage_path) =
            PathResolver::child_paths(ctx.user_id, parent.as_ref(), leaf);
        let mime_type = params
            .mime_type
            .filter(|m| !m.is_empty())
            .or_else(|| mime_from_path(leaf));
        let size_bytes = params.data.len() as i64;

        // Physical write first; prior bytes at the path are discarded.
        self.storage.write(&storage_path, params.data).await?;

        let node = match existing {
            Some(mut node) => {
                node.mime_type = mime_type;
                node.size_bytes = size_bytes;
                node.path = path;
                node.storage_path = storage_path;
                self.store.update(&node).await?
            }
            None => {
                self.store
                    .insert(&CreateNode {
                        owner_id: ctx.user_id,
                        parent_id,
                        name: leaf.to_string(),
                        is_folder: false,
                        path,
                        storage_path,
                        mime_type,
                        size_bytes,
                    })
                    .await?
            }
        };

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            path = %node.path,
            size = node.size_bytes,
            "File uploaded"
        );

        Ok(node)
    }

    /// Creates a folder under an optional parent.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> AppResult<Node> {
        let name = name.trim();
        validate_leaf_name(name)?;

        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let parent = self.require_folder(ctx, parent_id).await?;
        if self
            .store
            .find_by_parent_and_name(ctx.user_id, parent_id, name)
            .await?
            .is_some()
        {
            return Err(AppError::name_collision(format!(
                "A node named '{name}' already exists here"
            )));
        }

        let node = self.create_folder_node(ctx, parent.as_ref(), name).await?;

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            path = %node.path,
            "Folder created"
        );

        Ok(node)
    }

    /// Ensures a chain of folders exists under `start_parent_id`, creating
    /// missing ones physically and logically, and returns the terminal
    /// folder's id (None when `segments` is empty and the start parent is
    /// the root level).
    ///
    /// Idempotent with respect to folders that already exist — re-running
    /// the same chain never duplicates one.
    pub async fn ensure_folder_chain(
        &self,
        ctx: &RequestContext,
        start_parent_id: Option<Uuid>,
        segments: &[&str],
    ) -> AppResult<Option<Uuid>> {
        for segment in segments {
            validate_leaf_name(segment)?;
        }

        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let start = self.require_folder(ctx, start_parent_id).await?;
        let terminal = self.materialize_chain(ctx, start, segments).await?;
        Ok(terminal.map(|n| n.id))
    }

    /// Renames a node. The new name must be a bare name, not a path.
    ///
    /// A sibling already holding the new name fails the operation with a
    /// name collision before anything is touched on disk.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        new_name: &str,
    ) -> AppResult<Node> {
        let new_name = new_name.trim();
        validate_leaf_name(new_name)?;

        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let mut node = self
            .store
            .find_by_id(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        if let Some(sibling) = self
            .store
            .find_by_parent_and_name(ctx.user_id, node.parent_id, new_name)
            .await?
            && sibling.id != node.id
        {
            return Err(AppError::name_collision(format!(
                "A node named '{new_name}' already exists here"
            )));
        }

        let old_storage_path = node.storage_path.clone();
        node.name = new_name.to_string();
        let (path, storage_path) = self.resolver.resolve_paths(&node).await?;
        node.path = path;
        node.storage_path = storage_path;

        self.storage.rename(&old_storage_path, &node.storage_path).await?;
        let node = self.store.update(&node).await?;

        if node.is_folder {
            self.rewrite_descendant_paths(&node).await?;
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            new_name = %new_name,
            "Node renamed"
        );

        Ok(node)
    }

    /// Moves a node into a target folder (None moves it to the root
    /// level).
    ///
    /// A folder can never be moved into itself or into one of its own
    /// descendants. The directory move carries every descendant's bytes
    /// with it, so descendants only need their cached paths rewritten.
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        target_folder_id: Option<Uuid>,
    ) -> AppResult<Node> {
        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let mut node = self
            .store
            .find_by_id(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        let target = self.require_folder(ctx, target_folder_id).await?;

        if node.is_folder && let Some(target_node) = &target {
            if target_node.id == node.id {
                return Err(AppError::cyclic_move("Cannot move a folder into itself"));
            }
            if self
                .ancestry
                .is_descendant(target_node.id, node.id, ctx.user_id)
                .await?
            {
                return Err(AppError::cyclic_move(
                    "Cannot move a folder into one of its descendants",
                ));
            }
        }

        if let Some(sibling) = self
            .store
            .find_by_parent_and_name(ctx.user_id, target_folder_id, &node.name)
            .await?
            && sibling.id != node.id
        {
            return Err(AppError::name_collision(format!(
                "A node named '{}' already exists in the target folder",
                node.name
            )));
        }

        let old_storage_path = node.storage_path.clone();
        node.parent_id = target_folder_id;
        let (path, storage_path) = self.resolver.resolve_paths(&node).await?;
        node.path = path;
        node.storage_path = storage_path;

        self.storage.rename(&old_storage_path, &node.storage_path).await?;
        let node = self.store.update(&node).await?;

        if node.is_folder {
            self.rewrite_descendant_paths(&node).await?;
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            target = ?target_folder_id,
            path = %node.path,
            "Node moved"
        );

        Ok(node)
    }

    /// Deletes a node; folders cascade to their whole subtree, physical
    /// and logical. Deleting an unknown id is a no-op.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let _guard = self.owner_lock(ctx.user_id).lock_owned().await;

        let Some(node) = self.store.find_by_id(id, ctx.user_id).await? else {
            debug!(user_id = %ctx.user_id, node_id = %id, "Delete of unknown node is a no-op");
            return Ok(());
        };

        self.delete_recursive(&node).await?;

        info!(
            user_id = %ctx.user_id,
            node_id = %id,
            path = %node.path,
            "Node deleted"
        );

        Ok(())
    }

    /// Gets a single node.
    pub async fn get_node(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Node> {
        self.store
            .find_by_id(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))
    }

    /// Lists the children of a folder, or the root level when `parent_id`
    /// is None. Folders first, most recently updated first.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Node>> {
        if let Some(id) = parent_id {
            let node = self
                .store
                .find_by_id(id, ctx.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            if !node.is_folder {
                return Err(AppError::invalid_target("Node is not a folder"));
            }
        }
        self.store.list_children(ctx.user_id, parent_id).await
    }

    /// Lists every node the owner has, most recently updated first.
    pub async fn list_recent(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.store.list_all(ctx.user_id).await
    }

    /// Resolve `id` to a folder node, or None for the root level.
    async fn require_folder(
        &self,
        ctx: &RequestContext,
        id: Option<Uuid>,
    ) -> AppResult<Option<Node>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let node = self
            .store
            .find_by_id(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_target("Target folder not found"))?;
        if !node.is_folder {
            return Err(AppError::invalid_target("Target node is not a folder"));
        }
        Ok(Some(node))
    }

    /// Walk `segments` from `start`, descending into existing folders and
    /// creating missing ones. Caller must hold the owner lock.
    async fn materialize_chain(
        &self,
        ctx: &RequestContext,
        start: Option<Node>,
        segments: &[&str],
    ) -> AppResult<Option<Node>> {
        let mut parent = start;
        for &segment in segments {
            let parent_id = parent.as_ref().map(|p| p.id);
            let existing = self
                .store
                .find_by_parent_and_name(ctx.user_id, parent_id, segment)
                .await?;

            let node = match existing {
                Some(node) if node.is_folder => node,
                Some(node) => {
                    return Err(AppError::name_collision(format!(
                        "A file named '{}' is in the way of the folder chain",
                        node.name
                    )));
                }
                None => self.create_folder_node(ctx, parent.as_ref(), segment).await?,
            };
            parent = Some(node);
        }
        Ok(parent)
    }

    /// Create one folder — physical directory, then metadata row.
    async fn create_folder_node(
        &self,
        ctx: &RequestContext,
        parent: Option<&Node>,
        name: &str,
    ) -> AppResult<Node> {
        let (path, storage_path) = PathResolver::child_paths(ctx.user_id, parent, name);
        self.storage.create_dir(&storage_path).await?;
        self.store
            .insert(&CreateNode {
                owner_id: ctx.user_id,
                parent_id: parent.map(|p| p.id),
                name: name.to_string(),
                is_folder: true,
                path,
                storage_path,
                mime_type: None,
                size_bytes: 0,
            })
            .await
    }

    /// Rewrite cached paths for every descendant of `parent`, top-down.
    ///
    /// The descendants' bytes already moved with the parent directory, so
    /// this touches metadata only. Best-effort sequential: a failure
    /// partway leaves earlier siblings updated and later ones not.
    async fn rewrite_descendant_paths(&self, parent: &Node) -> AppResult<()> {
        let owner_id = parent.owner_id;
        let mut stack = vec![parent.clone()];

        while let Some(folder) = stack.pop() {
            let children = self.store.list_children(owner_id, Some(folder.id)).await?;
            for mut child in children {
                let (path, storage_path) =
                    PathResolver::child_paths(owner_id, Some(&folder), &child.name);
                child.path = path;
                child.storage_path = storage_path;
                let updated = self.store.update(&child).await?;
                if updated.is_folder {
                    stack.push(updated);
                }
            }
        }
        Ok(())
    }

    /// Post-order recursive delete: children before parent, physical
    /// before metadata at every node.
    async fn delete_recursive(&self, node: &Node) -> AppResult<()> {
        if node.is_folder {
            let children = self
                .store
                .list_children(node.owner_id, Some(node.id))
                .await?;
            for child in children {
                Box::pin(self.delete_recursive(&child)).await?;
            }
            self.storage.delete_dir(&node.storage_path).await?;
        } else {
            self.storage.delete(&node.storage_path).await?;
        }
        self.store.delete(node.id, node.owner_id).await?;
        Ok(())
    }
}

/// Reject names that would break out of the parent directory.
fn validate_segment(segment: &str) -> AppResult<()> {
    if segment == "." || segment == ".." {
        return Err(AppError::validation(
            "Name cannot be a relative path component",
        ));
    }
    Ok(())
}

/// A leaf name must be non-empty and free of path separators.
fn validate_leaf_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::validation(
            "Name cannot contain path separators",
        ));
    }
    validate_segment(name)
}
