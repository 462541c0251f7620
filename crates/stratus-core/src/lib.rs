//! # stratus-core
//!
//! Core crate for Stratus Drive. Contains the unified error system,
//! configuration schemas, typed identifiers, and the traits the tree
//! engine consumes (node store, storage provider).
//!
//! This crate depends only on `stratus-entity` (for the domain model its
//! traits speak) and never on any infrastructure crate.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
