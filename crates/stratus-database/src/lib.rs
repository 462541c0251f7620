//! # stratus-database
//!
//! PostgreSQL connection management and the concrete [`NodeStore`]
//! implementations: `PgNodeStore` (production) and `MemoryNodeStore`
//! (tests and embedded deployments).
//!
//! [`NodeStore`]: stratus_core::traits::NodeStore

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
