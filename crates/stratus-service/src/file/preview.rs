//! Inline text preview service.

use std::sync::Arc;

use uuid::Uuid;

use stratus_core::config::storage::StorageConfig;
use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::{NodeStore, StorageProvider};

use crate::context::RequestContext;

/// Serves small text files for inline preview.
///
/// Files larger than the configured cap are rejected outright rather than
/// streamed or truncated; the client is expected to fall back to a
/// download.
#[derive(Debug)]
pub struct PreviewService {
    /// Node metadata store.
    store: Arc<dyn NodeStore>,
    /// Physical storage backend.
    storage: Arc<dyn StorageProvider>,
    /// Storage configuration (preview size cap).
    config: StorageConfig,
}

/// Result of a preview request.
#[derive(Debug, Clone)]
pub struct PreviewResult {
    /// Decoded file content.
    pub content: String,
    /// MIME type of the underlying file.
    pub content_type: String,
}

impl PreviewService {
    /// Creates a new preview service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        storage: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            store,
            storage,
            config,
        }
    }

    /// Reads a file node's content as text.
    pub async fn get_preview(
        &self,
        ctx: &RequestContext,
        node_id: Uuid,
    ) -> AppResult<PreviewResult> {
        let node = self
            .store
            .find_by_id(node_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        if node.is_folder {
            return Err(AppError::validation("Folders have no preview"));
        }

        // The physical file is the authority on size; the cached
        // size_bytes could lag behind an interrupted overwrite.
        let meta = self.storage.metadata(&node.storage_path).await?;
        if meta.size_bytes > self.config.preview_cap_bytes {
            return Err(AppError::too_large(format!(
                "File is too large to preview ({} bytes, cap {})",
                meta.size_bytes, self.config.preview_cap_bytes
            )));
        }

        let data = self.storage.read_bytes(&node.storage_path).await?;
        let content = String::from_utf8(data.to_vec())
            .map_err(|_| AppError::validation("File is not valid UTF-8 text"))?;

        let content_type = node
            .mime_type
            .unwrap_or_else(|| "text/plain".to_string());

        Ok(PreviewResult {
            content,
            content_type,
        })
    }
}
