//! # stratus-api
//!
//! HTTP API layer for Stratus Drive built on Axum.
//!
//! Each endpoint is a thin adapter: it shapes the request payload into a
//! call on one of the tree engine's operations and serializes the
//! returned node or error. Authentication happens upstream; the fronting
//! layer passes the caller's identity in the `x-user-id` header.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
