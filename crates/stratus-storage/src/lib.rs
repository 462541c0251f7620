//! # stratus-storage
//!
//! Storage provider implementations for Stratus Drive. The local
//! filesystem provider backs every node tree; the provider trait lives
//! in `stratus-core`.

pub mod providers;

pub use providers::local::LocalStorageProvider;
