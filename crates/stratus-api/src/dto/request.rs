//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Rename request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// New name (a bare name, not a path).
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Move request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Target folder ID (None moves the node to the root level).
    pub target_folder_id: Option<Uuid>,
}
