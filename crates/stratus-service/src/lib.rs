//! # stratus-service
//!
//! Business logic layer for Stratus Drive. The `tree` module is the
//! tree-consistency engine: it keeps the metadata store's node tree and
//! the physical filesystem synchronized across upload, folder creation,
//! rename, move, and recursive delete. The `file` module serves file
//! content (preview, download) on top of the same tree.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod tree;

pub use context::RequestContext;
pub use file::{DownloadService, PreviewService};
pub use tree::{AncestryChecker, PathResolver, TreeService};
