//! File download service.

use std::sync::Arc;

use uuid::Uuid;

use stratus_core::error::AppError;
use stratus_core::result::AppResult;
use stratus_core::traits::storage::ByteStream;
use stratus_core::traits::{NodeStore, StorageProvider};

use crate::context::RequestContext;

/// Streams a file node's content.
#[derive(Debug)]
pub struct DownloadService {
    /// Node metadata store.
    store: Arc<dyn NodeStore>,
    /// Physical storage backend.
    storage: Arc<dyn StorageProvider>,
}

/// Result containing the content stream and response metadata.
pub struct DownloadResult {
    /// File content stream.
    pub stream: ByteStream,
    /// MIME type for the Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
    /// Content length in bytes.
    pub size_bytes: i64,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("stream", &"<ByteStream>")
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(store: Arc<dyn NodeStore>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { store, storage }
    }

    /// Downloads a file node.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        node_id: Uuid,
    ) -> AppResult<DownloadResult> {
        let node = self
            .store
            .find_by_id(node_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Node not found"))?;

        if node.is_folder {
            return Err(AppError::validation("Folders cannot be downloaded"));
        }

        let stream = self.storage.read(&node.storage_path).await?;

        let content_type = node
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(DownloadResult {
            stream,
            content_type,
            filename: node.name,
            size_bytes: node.size_bytes,
        })
    }
}
