//! The tree-consistency engine.
//!
//! A node tree lives in two places at once: as rows with parent pointers
//! in the metadata store, and as real files and directories on disk.
//! Everything in this module exists to mutate both together — filesystem
//! first, metadata second — so that a crash can strand orphaned bytes
//! but never a row pointing at missing content.

pub mod ancestry;
pub mod path;
pub mod service;

pub use ancestry::AncestryChecker;
pub use path::PathResolver;
pub use service::{TreeService, UploadParams};

/// Upper bound on tree depth accepted by the parent-chain walks.
///
/// The walk loops would only exceed this if the parent graph contained a
/// cycle, which the move preconditions make impossible; hitting the bound
/// therefore signals store corruption, not a deep tree.
pub(crate) const MAX_TREE_DEPTH: usize = 128;
