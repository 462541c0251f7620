//! Storage configuration.

use serde::{Deserialize, Serialize};

/// File storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which all user trees live. Each owner's
    /// private root is `{root_path}/{owner_id}`.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 1 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Maximum file size eligible for inline text preview (default 1 MiB).
    /// Larger files are rejected rather than streamed.
    #[serde(default = "default_preview_cap")]
    pub preview_cap_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
            preview_cap_bytes: default_preview_cap(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    1_073_741_824 // 1 GB
}

fn default_preview_cap() -> u64 {
    1_048_576 // 1 MiB
}
