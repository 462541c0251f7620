//! Node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single entry in a user's hierarchy — a file or a folder.
///
/// Both representations of the hierarchy hang off this row: `path` is the
/// logical slash-delimited location inside the owner's virtual tree, and
/// `storage_path` is the provider-relative location of the backing bytes
/// (file) or directory (folder). Every mutation that changes ancestry
/// recomputes both, for the node and all of its descendants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Unique node identifier.
    pub id: Uuid,
    /// The node owner. Every query is scoped by it.
    pub owner_id: Uuid,
    /// Parent folder ID (null for root-level nodes).
    pub parent_id: Option<Uuid>,
    /// The node's own display name (never contains a separator).
    pub name: String,
    /// Whether this node is a folder.
    pub is_folder: bool,
    /// Logical path from the owner's root, inclusive (e.g. `/docs/report.txt`).
    pub path: String,
    /// Physical location relative to the storage root (e.g. `{owner_id}/docs/report.txt`).
    pub storage_path: String,
    /// MIME type of the file (None for folders).
    pub mime_type: Option<String>,
    /// File size in bytes (0 for folders).
    pub size_bytes: i64,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this is a root-level node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new node record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNode {
    /// The node owner.
    pub owner_id: Uuid,
    /// Parent folder (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Node name.
    pub name: String,
    /// Whether the node is a folder.
    pub is_folder: bool,
    /// Logical path.
    pub path: String,
    /// Provider-relative physical path.
    pub storage_path: String,
    /// MIME type (None for folders).
    pub mime_type: Option<String>,
    /// Size in bytes (0 for folders).
    pub size_bytes: i64,
}
